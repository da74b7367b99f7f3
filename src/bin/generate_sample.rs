use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One catalogue row as written to CSV. The padded effect header and the
/// mixed-case labels exercise the loader's trimming and normalization.
#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = " Causes/Effects ")]
    effect: String,
    #[serde(rename = "Flavour of Aroma")]
    flavor: String,
    #[serde(rename = "Chemical Formula")]
    formula: Option<String>,
    #[serde(rename = "Food")]
    food: String,
    #[serde(rename = "Synthetic Aroma Agent Name")]
    synthetic: String,
    #[serde(rename = "Natural Agents")]
    natural: String,
}

/// Deterministic splitmix64 stream, so every run writes the same catalogue.
struct SampleRng(u64);

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// Effect spellings as they show up in hand-maintained spreadsheets.
const EFFECT_SPELLINGS: [&str; 12] = [
    "Irritation Effects",
    "irritation effects",
    "Specialized Effects",
    "specified effects",
    "SPECIALIZED EFFECTS",
    "Systemic Toxicity",
    "systemic toxicity",
    "Safety Approvals",
    "SAFETY APPROVALS",
    "Allergic Reaction",
    "allergic reaction",
    "Phototoxicity",
];

/// (flavour, formula, synthetic agent, natural agent)
const AGENTS: [(&str, Option<&str>, &str, &str); 8] = [
    ("Limonene", Some("C10H16"), "d-Limonene", "Orange peel oil"),
    ("Vanillin", Some("C8H8O3"), "Ethyl vanillin", "Vanilla bean"),
    ("Vanillin", None, "Synthetic vanillin", "Vanilla extract"),
    ("Cinnamon", Some("C9H8O"), "Cinnamaldehyde", "Cassia bark"),
    ("Mint", Some("C10H20O"), "Menthol", "Peppermint oil"),
    ("Citrus", Some("C10H18O"), "Linalool", "Bergamot oil"),
    ("Musk", None, "Galaxolide", "Ambrette seed"),
    ("Almond", Some("C7H6O"), "Benzaldehyde", "Bitter almond oil"),
];

const FOODS: [&str; 7] = [
    "Candy",
    "Soft drinks",
    "Bakery",
    "Ice cream",
    "Chewing gum",
    "Dairy",
    "Snacks",
];

fn main() -> Result<()> {
    let mut rng = SampleRng::new(42);

    let rows: Vec<SampleRow> = (0..120)
        .map(|_| {
            let &(flavor, formula, synthetic, natural) = rng.pick(&AGENTS);
            SampleRow {
                effect: rng.pick(&EFFECT_SPELLINGS).to_string(),
                flavor: flavor.to_string(),
                formula: formula.map(str::to_string),
                food: rng.pick(&FOODS).to_string(),
                synthetic: synthetic.to_string(),
                natural: natural.to_string(),
            }
        })
        .collect();

    // ---- CSV ----
    let csv_path = "sample_catalogue.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV output")?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;

    // ---- Parquet ----
    let column = |f: fn(&SampleRow) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let schema = Arc::new(Schema::new(vec![
        Field::new("Causes/Effects", DataType::Utf8, false),
        Field::new("Flavour of Aroma", DataType::Utf8, false),
        Field::new("Chemical Formula", DataType::Utf8, true),
        Field::new("Food", DataType::Utf8, false),
        Field::new("Synthetic Aroma Agent Name", DataType::Utf8, false),
        Field::new("Natural Agents", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            column(|r| Some(r.effect.as_str())),
            column(|r| Some(r.flavor.as_str())),
            column(|r| r.formula.as_deref()),
            column(|r| Some(r.food.as_str())),
            column(|r| Some(r.synthetic.as_str())),
            column(|r| Some(r.natural.as_str())),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_catalogue.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} catalogue rows to {csv_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
