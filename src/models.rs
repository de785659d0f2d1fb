use serde::Deserialize;

/// One row of the UCHRABVR pre-posting export. Column order is fixed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentRecord {
    pub nrec: String,
    pub tabn: String,
    pub mes: String,
    pub mesn: String,
    pub vidop: String,
    pub summa: String,
    pub summaval: String,
    pub datan: String,
    pub datok: String,
    pub clsch: String,
}

impl PaymentRecord {
    /// Copy of this record carrying a new accumulated sum.
    pub fn with_summa(&self, summa: String) -> Self {
        Self {
            summa,
            ..self.clone()
        }
    }
}

/// One row of the UDER withholding export. Column order is fixed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxRecord {
    pub nrec: String,
    pub tabn: String,
    pub mes: String,
    pub vidud: String,
    pub sumud: String,
    pub clsch: String,
    pub datav: String,
    pub vidoplud: String,
}

/// A withholding row that passed the tax filter, keyed by its two-character month.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRecordGrouped {
    pub record: TaxRecord,
    pub month_key: String,
}
