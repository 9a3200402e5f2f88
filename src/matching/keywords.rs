//! Lexical category hints from the wording of a ledger or taxonomy name

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::types::Category;

/// Curated whole-word term lists per category; each term also matches its plural
const LEXICON: [(Category, &str); 5] = [
    (
        Category::Asset,
        r"cash|bank|receivable|debtor|inventory|stock|asset|equipment|machinery|building|land|vehicle|deposit|advance|furniture|investment",
    ),
    (
        Category::Liability,
        r"payable|creditor|loan|liability|liabilities|borrowing|debt|overdraft|provision|outstanding",
    ),
    (
        Category::Income,
        r"sales|revenue|income|receipt|earning|profit|gain|interest\s+received|commission\s+received|discount\s+received",
    ),
    (
        Category::Expense,
        r"expense|cost|payment|purchase|salaries|salary|wages|rent|utility|utilities|depreciation|commission\s+paid|charges|fee",
    ),
    (
        Category::Equity,
        r"capital|equity|reserve|surplus|retained|drawings",
    ),
];

static PATTERNS: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    LEXICON
        .iter()
        .map(|(category, terms)| {
            let pattern = format!(r"(?i)\b(?:{terms})s?\b");
            let regex = Regex::new(&pattern).expect("keyword lexicon patterns are valid");
            (*category, regex)
        })
        .collect()
});

/// Set of category tags suggested by a name
///
/// Tags are independent: a name may carry none, one or several of them.
pub fn keywords_of(name: &str) -> BTreeSet<Category> {
    PATTERNS
        .iter()
        .filter(|(_, regex)| regex.is_match(name))
        .map(|(category, _)| *category)
        .collect()
}

/// Whether two tag sets share at least one category
pub fn shares_category(a: &BTreeSet<Category>, b: &BTreeSet<Category>) -> bool {
    !a.is_disjoint(b)
}

/// Comma-separated rendering used in rationales
pub fn describe(tags: &BTreeSet<Category>) -> String {
    tags.iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(name: &str) -> Vec<Category> {
        keywords_of(name).into_iter().collect()
    }

    #[test]
    fn test_single_category() {
        assert_eq!(tags("Cash in Hand"), vec![Category::Asset]);
        assert_eq!(tags("Sundry Creditors"), vec![Category::Liability]);
        assert_eq!(tags("Sales - Domestic"), vec![Category::Income]);
        assert_eq!(tags("Rent - Office Premises"), vec![Category::Expense]);
        assert_eq!(tags("Share Capital"), vec![Category::Equity]);
    }

    #[test]
    fn test_case_insensitive_whole_words() {
        assert_eq!(tags("BANK OF BARODA"), vec![Category::Asset]);
        // "rental" and "landmark" are not whole-word hits
        assert!(tags("Rental Landmark").is_empty());
        assert!(tags("Miscellaneous").is_empty());
    }

    #[test]
    fn test_multiple_tags() {
        let found = tags("Bank Charges");
        assert_eq!(found, vec![Category::Asset, Category::Expense]);

        let found = tags("Interest Received on Fixed Deposit");
        assert!(found.contains(&Category::Income));
        assert!(found.contains(&Category::Asset));
    }

    #[test]
    fn test_commission_is_only_tagged_with_direction() {
        assert!(tags("Commission").is_empty());
        assert_eq!(tags("Commission Received"), vec![Category::Income]);
        assert_eq!(tags("Commission Paid"), vec![Category::Expense]);
    }

    #[test]
    fn test_shares_category_and_describe() {
        let ledger = keywords_of("Office Rent");
        let grouping = keywords_of("Rent Expense");
        assert!(shares_category(&ledger, &grouping));
        assert!(!shares_category(&ledger, &keywords_of("Trade Payables")));
        assert_eq!(describe(&keywords_of("Bank Charges")), "asset, expense");
    }
}
