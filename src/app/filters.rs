//! Search and filtering logic

use super::App;
use crate::catalog::MapSheet;
use crate::constants::QUICK_SEARCH_LIMIT;

/// Case-insensitive substring match against name, id and secondary name.
/// `needle` must already be trimmed and lowercased.
fn sheet_matches(sheet: &MapSheet, needle: &str) -> bool {
    sheet.name.to_lowercase().contains(needle)
        || sheet.id.to_lowercase().contains(needle)
        || sheet
            .name_ar
            .as_ref()
            .is_some_and(|n| n.to_lowercase().contains(needle))
}

/// Indices of the sheets matching `query`, in catalog order.
/// A blank query matches everything.
pub(crate) fn filter_sheets(query: &str, sheets: &[MapSheet]) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    sheets
        .iter()
        .enumerate()
        .filter(|(_, s)| needle.is_empty() || sheet_matches(s, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// Inline lookup on the map: same matching, first few hits only.
/// Nothing is suggested until something is typed.
pub(crate) fn quick_search(query: &str, sheets: &[MapSheet]) -> Vec<usize> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let mut hits = filter_sheets(query, sheets);
    hits.truncate(QUICK_SEARCH_LIMIT);
    hits
}

impl App {
    pub fn apply_filters(&mut self) {
        self.session.refresh_filter(&self.catalog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use pretty_assertions::assert_eq;

    fn two_sheets() -> Catalog {
        Catalog::from_json(
            r#"{ "raster_url": "x", "sheets": [
                { "id": "NH-1", "name": "Tunis", "name_ar": "تونس", "shape": "rect", "href": "h" },
                { "id": "NH-2", "name": "Sfax", "shape": "rect", "href": "h" }
            ] }"#,
        )
        .unwrap()
    }

    fn ids(catalog: &Catalog, idx: &[usize]) -> Vec<String> {
        idx.iter().map(|&i| catalog.sheets()[i].id.clone()).collect()
    }

    #[test]
    fn matches_name_case_insensitively() {
        let c = two_sheets();
        assert_eq!(ids(&c, &filter_sheets("tun", c.sheets())), ["NH-1"]);
        assert_eq!(ids(&c, &filter_sheets("SFAX", c.sheets())), ["NH-2"]);
    }

    #[test]
    fn matches_id_and_keeps_catalog_order() {
        let c = two_sheets();
        assert_eq!(ids(&c, &filter_sheets("NH", c.sheets())), ["NH-1", "NH-2"]);
        assert_eq!(ids(&c, &filter_sheets("nh-2", c.sheets())), ["NH-2"]);
    }

    #[test]
    fn matches_secondary_name() {
        let c = two_sheets();
        assert_eq!(ids(&c, &filter_sheets("تون", c.sheets())), ["NH-1"]);
    }

    #[test]
    fn no_match_is_empty() {
        let c = two_sheets();
        assert!(filter_sheets("zzz", c.sheets()).is_empty());
    }

    #[test]
    fn blank_query_is_identity() {
        let c = Catalog::embedded().unwrap();
        let all: Vec<usize> = (0..c.len()).collect();
        assert_eq!(filter_sheets("", c.sheets()), all);
        assert_eq!(filter_sheets("   \t", c.sheets()), all);
    }

    #[test]
    fn query_is_trimmed() {
        let c = two_sheets();
        assert_eq!(ids(&c, &filter_sheets("  sfax ", c.sheets())), ["NH-2"]);
    }

    #[test]
    fn results_partition_catalog() {
        let c = Catalog::embedded().unwrap();
        for q in ["a", "Ma", "00", "ة", "xyz", "1"] {
            let hits = filter_sheets(q, c.sheets());
            assert!(hits.windows(2).all(|w| w[0] < w[1]), "order for {q:?}");
            let needle = q.to_lowercase();
            for (i, sheet) in c.sheets().iter().enumerate() {
                assert_eq!(hits.contains(&i), sheet_matches(sheet, &needle), "{q:?} vs {}", sheet.id);
            }
        }
    }

    #[test]
    fn repeated_calls_agree() {
        let c = Catalog::embedded().unwrap();
        assert_eq!(filter_sheets("ma", c.sheets()), filter_sheets("ma", c.sheets()));
    }

    #[test]
    fn quick_search_caps_results() {
        let c = Catalog::embedded().unwrap();
        let full = filter_sheets("0", c.sheets());
        assert!(full.len() > QUICK_SEARCH_LIMIT);
        let quick = quick_search("0", c.sheets());
        assert_eq!(quick, full[..QUICK_SEARCH_LIMIT].to_vec());
    }

    #[test]
    fn quick_search_waits_for_input() {
        let c = two_sheets();
        assert!(quick_search("", c.sheets()).is_empty());
        assert!(quick_search("  ", c.sheets()).is_empty());
        assert_eq!(ids(&c, &quick_search("sf", c.sheets())), ["NH-2"]);
    }
}
