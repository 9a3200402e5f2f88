//! Trial balance classification example

use bigdecimal::BigDecimal;
use ledger_classifier::{
    BatchClassifier, BatchOptions, ClassifierConfig, ExternalSuggestion, LedgerRecord,
    ProviderError, StaticSuggestionProvider, Taxonomy,
};

const TAXONOMY: &str = r#"{
  "majorHeads": [
    { "code": "EXP", "name": "Expenses" },
    { "code": "REV", "name": "Revenue" },
    { "code": "CA", "name": "Current Assets" },
    { "code": "CL", "name": "Current Liabilities" }
  ],
  "minorHeads": [
    { "code": "OEX", "name": "Other Expenses", "majorHeadCode": "EXP" },
    { "code": "EBE", "name": "Employee Benefits Expense", "majorHeadCode": "EXP" },
    { "code": "RFO", "name": "Revenue from Operations", "majorHeadCode": "REV" },
    { "code": "CCE", "name": "Cash and Cash Equivalents", "majorHeadCode": "CA" },
    { "code": "TRC", "name": "Trade Receivables", "majorHeadCode": "CA" },
    { "code": "TPY", "name": "Trade Payables", "majorHeadCode": "CL" }
  ],
  "groupings": [
    { "code": "RENT", "name": "Rent Expense", "minorHeadCode": "OEX" },
    { "code": "POWER", "name": "Power and Fuel", "minorHeadCode": "OEX" },
    { "code": "SAL", "name": "Salaries and Wages", "minorHeadCode": "EBE" },
    { "code": "SALES", "name": "Sale of Products", "minorHeadCode": "RFO" },
    { "code": "CASH", "name": "Cash on Hand", "minorHeadCode": "CCE" },
    { "code": "DEBT", "name": "Sundry Debtors", "minorHeadCode": "TRC" },
    { "code": "CRED", "name": "Sundry Creditors", "minorHeadCode": "TPY" }
  ],
  "lineItems": [
    { "code": "RENT-OFF", "name": "Office Rent", "groupingCode": "RENT" },
    { "code": "ELEC", "name": "Electricity Charges", "groupingCode": "POWER" }
  ]
}"#;

const CONFIG: &str = r#"
[arbitration]
ai_floor = 0.85
fuzzy_floor = 0.55

[batch]
max_concurrency = 4
provider_timeout_ms = 2000
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📒 Ledger Classifier - Trial Balance Example\n");

    let taxonomy = Taxonomy::from_json(TAXONOMY)?;
    println!("📊 Loaded taxonomy with {} nodes\n", taxonomy.len());

    let mut trial_balance = vec![
        LedgerRecord::new("TB001", "Rent - Office Premises", BigDecimal::from(240000)),
        LedgerRecord::new("TB002", "Electricity Charges", BigDecimal::from(38500)),
        LedgerRecord::new("TB003", "Salary and Wages", BigDecimal::from(910000)),
        LedgerRecord::new("TB004", "Sales of Products", BigDecimal::from(-2750000)),
        LedgerRecord::new("TB005", "Cash in Hand", BigDecimal::from(18250)),
        LedgerRecord::new("TB006", "Sundry Creditors for Goods", BigDecimal::from(-412000)),
        LedgerRecord::new("TB007", "Commission", BigDecimal::from(-15000)),
    ];

    // Stand-in for a remote suggestion service
    let provider = StaticSuggestionProvider::new();
    provider.insert(
        "Electricity Charges",
        ExternalSuggestion::new("EXP", "OEX", "POWER", 0.93)
            .with_line_item("ELEC")
            .with_reasoning("Electricity is a power and fuel cost"),
    );
    provider.insert(
        "Commission",
        ExternalSuggestion::new("EXP", "OEX", "COMM", 0.91),
    );

    let classifier = BatchClassifier::new(provider.clone(), ClassifierConfig::from_toml_str(CONFIG)?)?;

    println!("🔎 Classifying {} ledgers...", trial_balance.len());
    let report = classifier
        .classify_batch(&trial_balance, &taxonomy, BatchOptions::default(), |done, total| {
            println!("  … {done}/{total}")
        })
        .await;
    println!();

    for outcome in &report.outcomes {
        match &outcome.suggestion {
            Some(suggestion) => println!(
                "  ✓ {:<28} → {}/{}/{} ({:?}, {:.0}%) {}",
                outcome.ledger_name,
                suggestion.mapping.major_head_code,
                suggestion.mapping.minor_head_code,
                suggestion.mapping.grouping_code,
                suggestion.source,
                suggestion.confidence * 100.0,
                suggestion.rationale
            ),
            None => println!("  ✗ {:<28} → left for manual review", outcome.ledger_name),
        }
    }

    println!("\n📈 Summary ({:?})", report.mode);
    println!("  AI mapped:        {}", report.counts.ai_mapped);
    println!("  Fuzzy mapped:     {}", report.counts.fuzzy_mapped);
    println!("  Keyword mapped:   {}", report.counts.keyword_mapped);
    println!("  Unmapped:         {}", report.counts.unmapped);
    println!("  Rejected (AI):    {}", report.counts.rejected_external);

    // Commit accepted suggestions back onto the records
    for (ledger, outcome) in trial_balance.iter_mut().zip(&report.outcomes) {
        if let Some(suggestion) = &outcome.suggestion {
            ledger.commit(suggestion, &taxonomy)?;
        }
    }
    let mapped = trial_balance.iter().filter(|l| l.is_mapped()).count();
    println!("\n💾 Committed {mapped} of {} mappings", trial_balance.len());

    // Simulate the remote service going down mid-close
    println!("\n⚠️  Re-running with the suggestion service unavailable...");
    provider.fail_all(ProviderError::Unavailable("service returned 503".to_string()));
    let report = classifier
        .classify_batch(&trial_balance, &taxonomy, BatchOptions::default(), |_, _| {})
        .await;
    println!("  Mode: {:?}", report.mode);
    println!(
        "  Locally mapped {} of {} ledgers",
        report.counts.local_mapped(),
        report.outcomes.len()
    );

    Ok(())
}
