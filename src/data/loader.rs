use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use calamine::{DataType as Cell, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    AromaDataset, EFFECT_COLUMN, FLAVOR_COLUMN, FOOD_COLUMN, FORMULA_COLUMN, NATURAL_COLUMN,
    REQUIRED_COLUMNS, RawRecord, SYNTHETIC_COLUMN,
};
use super::normalize::UnmappedPolicy;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a catalogue could not be loaded. None of these yield a partial dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {reason}", path.display())]
    SourceNotFound { path: PathBuf, reason: String },

    #[error("required field '{0}' is missing")]
    MissingField(String),

    #[error("required field '{field}' is empty in data row {row}")]
    EmptyValue { field: String, row: usize },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("failed to read {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("effect label '{0}' is not in the synonym table")]
    UnmappedLabel(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an aroma catalogue from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "Causes/Effects": "...", "Food": "...", ... }, ...]`
/// * `.parquet` – one column per field
pub fn load_file(path: &Path, policy: UnmappedPolicy) -> Result<AromaDataset, LoadError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(LoadError::SourceNotFound {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }
        Err(e) => {
            return Err(LoadError::SourceNotFound {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path),
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    }
    .map_err(|e| LoadError::Malformed {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;

    let dataset = build_dataset(table, policy)?;
    log::info!(
        "Loaded {} records with {} distinct effects from {}",
        dataset.len(),
        dataset.effects().len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Format-independent table → dataset
// ---------------------------------------------------------------------------

/// A source table before schema validation. `None` marks an empty cell.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Validate the schema of `table` and normalize its rows.
pub fn build_dataset(table: RawTable, policy: UnmappedPolicy) -> Result<AromaDataset, LoadError> {
    let headers: Vec<String> = table.headers.iter().map(|h| h.trim().to_string()).collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = column(name).ok_or_else(|| LoadError::MissingField(name.to_string()))?;
    }
    let [effect_idx, flavor_idx, food_idx, synthetic_idx, natural_idx] = required;
    let formula_idx = column(FORMULA_COLUMN);

    let mut raw = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        // Data rows are reported 1-based, excluding the header.
        let row_no = i + 1;
        let cell = |idx: usize| {
            row.get(idx)
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .filter(|c| !c.is_empty())
        };
        let required_cell = |idx: usize, field: &str| {
            cell(idx).map(str::to_string).ok_or_else(|| LoadError::EmptyValue {
                field: field.to_string(),
                row: row_no,
            })
        };

        raw.push(RawRecord {
            effect: required_cell(effect_idx, EFFECT_COLUMN)?,
            flavor: required_cell(flavor_idx, FLAVOR_COLUMN)?,
            chemical_formula: formula_idx.and_then(|idx| cell(idx)).map(str::to_string),
            food: required_cell(food_idx, FOOD_COLUMN)?,
            synthetic_agent: required_cell(synthetic_idx, SYNTHETIC_COLUMN)?,
            natural_agent: required_cell(natural_idx, NATURAL_COLUMN)?,
        });
    }

    AromaDataset::from_raw(raw, formula_idx.is_some(), policy)
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| cell_to_text(c).unwrap_or_default()).collect(),
        None => bail!("worksheet is empty"),
    };
    let rows = rows
        .map(|r| r.iter().map(cell_to_text).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn cell_to_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). The header set is
/// the union of keys in first-seen order.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_to_text))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the catalogue. Every column is read as text;
/// numeric and boolean cells are stringified.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(headers.len());
            for col in batch.columns() {
                cells.push(extract_text(col, row)?);
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column as text.
fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row)
            .to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row)
            .to_string(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row)
            .to_string(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row)
            .to_string(),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row)
            .to_string(),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .context("expected BooleanArray")?
            .value(row)
            .to_string(),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str =
        " Causes/Effects ,Flavour of Aroma,Chemical Formula,Food,Synthetic Aroma Agent Name,Natural Agents";

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| {
                    r.iter()
                        .map(|c| (!c.is_empty()).then(|| c.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn csv_with_padded_headers_loads() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n\
             IRRITATION EFFECTS,Limonene,C10H16,Candy,d-Limonene,Orange peel\n\
             specified effects,Vanillin,,Ice cream,Ethyl vanillin,Vanilla bean\n"
        );
        let path = write_file(&dir, "catalogue.csv", &body);

        let ds = load_file(&path, UnmappedPolicy::PassThrough).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.has_formula_column());
        let recs = ds.records();
        assert_eq!(recs[0].canonical_effect, "Irritation Effects");
        assert_eq!(recs[0].composite_flavor(), "Limonene (C10H16)");
        assert_eq!(recs[1].canonical_effect, "Specialized Effects");
        assert_eq!(recs[1].chemical_formula, None);
    }

    #[test]
    fn missing_food_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "no_food.csv",
            "Causes/Effects,Flavour of Aroma,Synthetic Aroma Agent Name,Natural Agents\n\
             Allergic Reaction,Citral,Citral,Lemongrass\n",
        );

        let err = load_file(&path, UnmappedPolicy::PassThrough).unwrap_err();
        match err {
            LoadError::MissingField(field) => assert_eq!(field, "Food"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("perfumedata.xlsx"), UnmappedPolicy::PassThrough)
            .unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound { .. }));
    }

    #[test]
    fn directory_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perfumedata.xlsx");
        std::fs::create_dir(&path).unwrap();
        let err = load_file(&path, UnmappedPolicy::PassThrough).unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound { .. }), "{err:?}");
    }

    #[test]
    fn xlsx_first_sheet_loads() {
        use rust_xlsxwriter::Workbook;

        let header = [
            " Causes/Effects ",
            "Flavour of Aroma",
            "Chemical Formula",
            "Food ",
            "Synthetic Aroma Agent Name",
            "Natural Agents",
        ];
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let rows = [
            ["SAFETY APPROVALS", "Mint", "C10H20O", "Gum", "Menthol", "Peppermint oil"],
            ["specified effects", "Vanillin", "", "Ice cream", "Ethyl vanillin", "Vanilla bean"],
        ];
        for (r, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32 + 1, col as u16, *value).unwrap();
                }
            }
        }
        // Numeric cell in the flavour column of a third row.
        sheet.write_string(3, 0, "Allergic reaction").unwrap();
        sheet.write_number(3, 1, 7.0).unwrap();
        sheet.write_string(3, 3, "Candy").unwrap();
        sheet.write_string(3, 4, "Agent 7").unwrap();
        sheet.write_string(3, 5, "Clove").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perfumedata.xlsx");
        workbook.save(&path).unwrap();

        let ds = load_file(&path, UnmappedPolicy::PassThrough).unwrap();
        assert_eq!(ds.len(), 3);
        assert!(ds.has_formula_column());
        assert_eq!(
            ds.effects(),
            ["Safety Approvals", "Specialized Effects", "Allergic Reaction"]
        );
        let recs = ds.records();
        assert_eq!(recs[0].composite_flavor(), "Mint (C10H20O)");
        assert_eq!(recs[0].food, "Gum");
        assert_eq!(recs[1].chemical_formula, None);
        assert_eq!(recs[1].composite_flavor(), "Vanillin");
        assert_eq!(recs[2].flavor, "7");
        assert!(ds.unmapped_labels().is_empty());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "catalogue.txt", "whatever");
        let err = load_file(&path, UnmappedPolicy::PassThrough).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "txt"));
    }

    #[test]
    fn broken_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "catalogue.json", "{ not json");
        let err = load_file(&path, UnmappedPolicy::PassThrough).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn json_records_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "catalogue.json",
            r#"[
                {"Causes/Effects": "Safety Approvals", "Flavour of Aroma": "Mint",
                 "Food": "Gum", "Synthetic Aroma Agent Name": "Menthol",
                 "Natural Agents": "Peppermint oil", "Chemical Formula": null},
                {"Causes/Effects": "allergic reaction", "Flavour of Aroma": "Cinnamon",
                 "Food": "Bakery", "Synthetic Aroma Agent Name": "Cinnamaldehyde",
                 "Natural Agents": "Cassia bark", "Chemical Formula": "C9H8O"}
            ]"#,
        );

        let ds = load_file(&path, UnmappedPolicy::PassThrough).unwrap();
        assert_eq!(ds.effects(), ["Safety Approvals", "Allergic Reaction"]);
        assert_eq!(ds.records()[0].composite_flavor(), "Mint");
        assert_eq!(ds.records()[1].composite_flavor(), "Cinnamon (C9H8O)");
    }

    #[test]
    fn parquet_string_columns_load() {
        use arrow::array::ArrayRef;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let names = [
            EFFECT_COLUMN,
            FLAVOR_COLUMN,
            FORMULA_COLUMN,
            FOOD_COLUMN,
            SYNTHETIC_COLUMN,
            NATURAL_COLUMN,
        ];
        let schema = Arc::new(Schema::new(
            names
                .iter()
                .map(|n| Field::new(*n, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("systemic toxicity"), Some("Phototoxic")])),
            Arc::new(StringArray::from(vec![Some("Musk"), Some("Bergamot")])),
            Arc::new(StringArray::from(vec![None, Some("C15H14O3")])),
            Arc::new(StringArray::from(vec![Some("Perfume"), Some("Tea")])),
            Arc::new(StringArray::from(vec![Some("Galaxolide"), Some("Bergapten")])),
            Arc::new(StringArray::from(vec![Some("Ambrette seed"), Some("Bergamot FCF")])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path, UnmappedPolicy::PassThrough).unwrap();
        assert_eq!(ds.effects(), ["Systemic Toxicity", "phototoxic"]);
        assert_eq!(ds.records()[0].chemical_formula, None);
        assert_eq!(ds.records()[1].composite_flavor(), "Bergamot (C15H14O3)");
        assert!(ds.unmapped_labels().contains("phototoxic"));
    }

    #[test]
    fn empty_required_cell_rejects_whole_table() {
        let t = table(
            &REQUIRED_COLUMNS,
            &[
                &["Allergic Reaction", "Citral", "Candy", "Citral", "Lemongrass"],
                &["Allergic Reaction", "Citral", "  ", "Citral", "Lemongrass"],
            ],
        );
        match build_dataset(t, UnmappedPolicy::PassThrough).unwrap_err() {
            LoadError::EmptyValue { field, row } => {
                assert_eq!(field, FOOD_COLUMN);
                assert_eq!(row, 2);
            }
            other => panic!("expected EmptyValue, got {other:?}"),
        }
    }

    #[test]
    fn first_missing_field_is_named() {
        let t = table(&[FLAVOR_COLUMN, FOOD_COLUMN], &[]);
        let err = build_dataset(t, UnmappedPolicy::PassThrough).unwrap_err();
        assert!(matches!(err, LoadError::MissingField(ref f) if f == EFFECT_COLUMN));
        assert_eq!(err.to_string(), "required field 'Causes/Effects' is missing");
    }

    #[test]
    fn table_without_formula_column_uses_bare_flavors() {
        let t = table(
            &REQUIRED_COLUMNS,
            &[&["systemic toxicity", "Musk", "Perfume", "Galaxolide", "Ambrette seed"]],
        );
        let ds = build_dataset(t, UnmappedPolicy::PassThrough).unwrap();
        assert!(!ds.has_formula_column());
        assert_eq!(ds.records()[0].composite_flavor(), "Musk");
        assert_eq!(ds.records()[0].canonical_effect, "Systemic Toxicity");
    }

    #[test]
    fn short_rows_count_as_empty_cells() {
        let t = table(&REQUIRED_COLUMNS, &[&["Allergic Reaction", "Citral"]]);
        let err = build_dataset(t, UnmappedPolicy::PassThrough).unwrap_err();
        assert!(matches!(err, LoadError::EmptyValue { ref field, row: 1 } if field == FOOD_COLUMN));
    }
}
