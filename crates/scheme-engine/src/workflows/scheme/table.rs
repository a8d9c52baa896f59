use std::io::{Read, Write};

/// Columns of a scheme export that the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    RefName,
    RefNo,
    CustomerLtv,
    Tenure,
    SecuredLegalName,
    SecuredLtv,
    OverallInterest,
    SecuredAddon,
    UnsecuredAddon,
    UnsecuredCalculation,
    ChargeText,
    UnsecuredCharge2,
    UnsecuredCharge3,
    UnsecuredChargeCount,
    UnsecuredLegalName,
    Description,
    ApplicableProcesses,
}

impl Column {
    pub const fn header(self) -> &'static str {
        match self {
            Self::RefName => "refName",
            Self::RefNo => "refno",
            Self::CustomerLtv => "customerLtv",
            Self::Tenure => "tenure",
            Self::SecuredLegalName => "bs1-legalName",
            Self::SecuredLtv => "bs1-ltv",
            Self::OverallInterest => "OverallInterestCalculation",
            Self::SecuredAddon => "bs1-addon-1",
            Self::UnsecuredAddon => "bs2-addon-1",
            Self::UnsecuredCalculation => "bs2-calculation",
            Self::ChargeText => "chargeText",
            Self::UnsecuredCharge2 => "bs2-charge-2",
            Self::UnsecuredCharge3 => "bs2-charge-3",
            Self::UnsecuredChargeCount => "bs2-NoOfCharges",
            Self::UnsecuredLegalName => "bs2-legalName",
            Self::Description => "description",
            Self::ApplicableProcesses => "applicableProcesses",
        }
    }
}

/// New text for one cell of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub column: Column,
    pub value: String,
}

impl FieldUpdate {
    pub fn new(column: Column, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// A scheme export held as text cells, keeping every column the engine does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemeTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SchemeTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self { headers, rows };
        table.pad_rows();
        table
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = csv_reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self::new(headers, rows))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<SchemeRow<'_>> {
        (index < self.rows.len()).then_some(SchemeRow { table: self, index })
    }

    fn column_index(&self, column: Column) -> Option<usize> {
        self.headers.iter().position(|header| header == column.header())
    }

    fn ensure_column(&mut self, column: Column) -> usize {
        if let Some(index) = self.column_index(column) {
            return index;
        }
        self.headers.push(column.header().to_string());
        self.pad_rows();
        self.headers.len() - 1
    }

    fn pad_rows(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
    }

    /// Writes `updates` into row `index`, appending any column the table lacks.
    pub fn apply(&mut self, index: usize, updates: Vec<FieldUpdate>) {
        if index >= self.rows.len() {
            return;
        }
        for update in updates {
            let column = self.ensure_column(update.column);
            self.rows[index][column] = update.value;
        }
    }

    pub fn cell(&self, index: usize, column: Column) -> Option<&str> {
        self.row(index).and_then(|row| row.get(column))
    }
}

/// Read-only view of one row.
#[derive(Debug, Clone, Copy)]
pub struct SchemeRow<'a> {
    table: &'a SchemeTable,
    index: usize,
}

impl<'a> SchemeRow<'a> {
    /// Cell text, or `None` when the table has no such column.
    pub fn get(&self, column: Column) -> Option<&'a str> {
        let position = self.table.column_index(column)?;
        self.table.rows[self.index].get(position).map(String::as_str)
    }
}
