//! Item/quantity extraction from resource table cells
//!
//! Cells list one or more `name,xN` pairs, e.g. `英雄の証,x5` or
//! `QP,x3万`. A trailing `万` multiplies the count by ten thousand.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::ItemQuantity;

/// The "ten-thousand" multiplier suffix
pub const TEN_THOUSAND_SUFFIX: char = '万';

const TEN_THOUSAND: u64 = 10_000;

static ITEM_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<item>[^,\n]+?)\s*,\s*[xX×]?(?P<count>[0-9]+)(?P<man>万)?")
        .expect("valid regex")
});

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[xX×]?(?P<count>[0-9]+)(?P<man>万)?$").expect("valid regex")
});

/// Parse a quantity string such as `5`, `x10`, or `3万`
pub fn parse_quantity(text: &str) -> Option<u64> {
    let caps = QUANTITY.captures(text.trim())?;
    expand(&caps["count"], caps.name("man").is_some())
}

fn expand(count: &str, ten_thousands: bool) -> Option<u64> {
    let count: u64 = count.parse().ok()?;
    if ten_thousands {
        count.checked_mul(TEN_THOUSAND)
    } else {
        Some(count)
    }
}

/// Extract every `name,quantity` pair in `text`, in source order
pub fn parse_items(text: &str) -> Vec<ItemQuantity> {
    ITEM_QUANTITY
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps["item"].trim();
            if name.is_empty() {
                return None;
            }
            let Some(quantity) = expand(&caps["count"], caps.name("man").is_some()) else {
                tracing::warn!("Quantity out of range for {}: {}", name, &caps["count"]);
                return None;
            };
            tracing::debug!("items {} x {}", name, quantity);
            Some(ItemQuantity::new(name, quantity))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_thousand_suffix() {
        assert_eq!(parse_quantity("3万"), Some(30_000));
        assert_eq!(parse_quantity("x120万"), Some(1_200_000));
        assert_eq!(parse_quantity("15"), Some(15));
        assert_eq!(parse_quantity("many"), None);
    }

    #[test]
    fn test_single_pair() {
        assert_eq!(parse_items("item-A,x3"), vec![ItemQuantity::new("item-A", 3)]);
        assert_eq!(parse_items("QP,x10000"), vec![ItemQuantity::new("QP", 10_000)]);
    }

    #[test]
    fn test_multiple_pairs_in_one_cell() {
        let items = parse_items("英雄の証,x5\n凶骨,x10 QP,x3万");
        assert_eq!(
            items,
            vec![
                ItemQuantity::new("英雄の証", 5),
                ItemQuantity::new("凶骨", 10),
                ItemQuantity::new("QP", 30_000),
            ]
        );
    }

    #[test]
    fn test_pairs_without_separator() {
        let items = parse_items("セイバーピース,x4QP,x5万");
        assert_eq!(
            items,
            vec![ItemQuantity::new("セイバーピース", 4), ItemQuantity::new("QP", 50_000)]
        );
    }

    #[test]
    fn test_no_pairs() {
        assert!(parse_items("必要素材").is_empty());
        assert!(parse_items("").is_empty());
    }
}
