use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use serde::de::DeserializeOwned;

use crate::error::{ReconError, Result};
use crate::models::{PaymentRecord, TaxRecord};

// ---------------------------------------------------------------------------
// Galaktika exports: headerless comma-separated rows, fixed column order
// ---------------------------------------------------------------------------

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(source)
}

fn open(file_path: &Path) -> Result<BufReader<File>> {
    File::open(file_path)
        .map(BufReader::new)
        .map_err(|source| ReconError::Input {
            path: file_path.to_path_buf(),
            source,
        })
}

/// Lazily deserialize rows of `source`, decoded from `encoding`, into `T`.
pub fn read_rows<T, R>(source: R, encoding: &'static Encoding) -> impl Iterator<Item = Result<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(source);
    reader(decoded)
        .into_deserialize::<T>()
        .map(|row| row.map_err(ReconError::from))
}

pub fn payment_records(
    file_path: &Path,
    encoding: &'static Encoding,
) -> Result<impl Iterator<Item = Result<PaymentRecord>>> {
    Ok(read_rows(open(file_path)?, encoding))
}

pub fn tax_records(
    file_path: &Path,
    encoding: &'static Encoding,
) -> Result<impl Iterator<Item = Result<TaxRecord>>> {
    Ok(read_rows(open(file_path)?, encoding))
}

/// Write statements separated by CRLF in `encoding`, as the Galaktika batch
/// loader expects.
pub fn write_statements(
    file_path: &Path,
    statements: &[String],
    encoding: &'static Encoding,
) -> Result<()> {
    let to_output_error = |source| ReconError::Output {
        path: file_path.to_path_buf(),
        source,
    };
    let joined = statements.join("\r\n");
    let (bytes, _, unmappable) = encoding.encode(&joined);
    if unmappable {
        return Err(ReconError::Other(format!(
            "Statements for {} contain characters that {} cannot encode",
            file_path.display(),
            encoding.name()
        )));
    }
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_output_error)?;
    }
    std::fs::write(file_path, bytes).map_err(to_output_error)
}
