//! Property-based tests for aggregation, filtering and signing

#[cfg(test)]
mod tests {
    use crate::auth::{RequestId, SessionArtifacts, SignatureDeriver};
    use crate::orders::{split_page, Aggregator, MonthWindow, Order, OrderScope};
    use crate::report::{sort_rows, ReportRow, SortDirection, SortKey};
    use chrono::{Datelike, FixedOffset, NaiveDate};
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn line_items() -> impl Strategy<Value = Vec<(String, u64)>> {
        prop::collection::vec(("[A-D]", 0u64..20), 0..6)
    }

    fn order(status: &str, day: u32, items: &[(String, u64)]) -> Order {
        let products: Vec<_> = items
            .iter()
            .map(|(name, count)| json!({ "name": name, "count": count }))
            .collect();
        Order::from_value(&json!({
            "status": status,
            "placedTime": format!("2026-10-{day:02}T10:00:00Z"),
            "productsNamesAndCounts": products,
        }))
    }

    // Property test: every counted unit comes from exactly one line item
    proptest! {
        #[test]
        fn test_aggregate_conserves_counts(
            orders in prop::collection::vec((1u32..=28, line_items()), 0..12),
        ) {
            let orders: Vec<Order> = orders
                .iter()
                .map(|(day, items)| order("DELIVERED", *day, items))
                .collect();

            let mut expected: HashMap<String, (u64, usize)> = HashMap::new();
            for order in &orders {
                for item in order.products.as_deref().unwrap_or_default() {
                    let entry = expected
                        .entry(item["name"].as_str().unwrap().to_string())
                        .or_default();
                    entry.0 += item["count"].as_u64().unwrap();
                    entry.1 += 1;
                }
            }

            let mut aggregator = Aggregator::new("");
            aggregator.fold(&orders);

            prop_assert_eq!(aggregator.len(), expected.len());
            prop_assert_eq!(aggregator.skipped_orders(), 0);
            for (name, (count, lines)) in &expected {
                let product = aggregator.get(name).unwrap();
                prop_assert_eq!(product.count, *count);
                prop_assert_eq!(product.order_dates.len(), *lines);
            }
            prop_assert_eq!(
                aggregator.total_count(),
                expected.values().map(|(count, _)| count).sum::<u64>()
            );
        }
    }

    // Property test: only delivered orders of the target month contribute
    proptest! {
        #[test]
        fn test_split_page_partitions_orders(
            orders in prop::collection::vec(
                (
                    prop::sample::select(vec!["DELIVERED", "delivered", "CANCELLED"]),
                    prop::sample::select(vec![
                        "2026-09-30",
                        "2026-10-01",
                        "2026-10-31",
                        "2025-10-15",
                    ]),
                ),
                0..20,
            ),
        ) {
            let window = MonthWindow::new(9, 2026, utc()).unwrap();
            let orders: Vec<Order> = orders
                .iter()
                .map(|(status, date)| Order::from_value(&json!({
                    "status": status,
                    "placedTime": format!("{date}T12:00:00Z"),
                    "productsNamesAndCounts": [],
                })))
                .collect();

            let split = split_page(&window, &orders);
            let in_scope = orders
                .iter()
                .filter(|o| window.classify(o) == OrderScope::InScope)
                .count();
            let boundary = orders
                .iter()
                .filter(|o| o.placed_time.as_deref().is_some_and(|t| t.starts_with("2026-09")))
                .count();

            prop_assert_eq!(split.in_scope.len(), in_scope);
            prop_assert_eq!(split.boundary, boundary);
            for order in &split.in_scope {
                prop_assert!(order.is_delivered());
                prop_assert!(order.placed_time.as_deref().unwrap().starts_with("2026-10"));
            }
        }
    }

    // Property test: the resolved window is never in the future
    proptest! {
        #[test]
        fn test_resolved_window_not_in_future(
            target in 0u32..12,
            year in 2000i32..2100,
            ordinal in 1u32..=365,
        ) {
            let today = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            let window = MonthWindow::resolve(target, today, utc()).unwrap();

            prop_assert!(window.first_day().unwrap() <= today);
            prop_assert!(window.year == today.year() || window.year == today.year() - 1);
            if window.year < today.year() {
                prop_assert!(target > today.month0());
            }
        }
    }

    // Property test: signatures depend on every signed input
    proptest! {
        #[test]
        fn test_signature_binds_page_and_request_id(
            device in "[a-z0-9]{1,12}",
            token in "[A-Za-z0-9%]{1,16}",
            request_id in "[a-f0-9-]{8,36}",
            page in 1u32..500,
        ) {
            let session = SessionArtifacts::new(device, token, "secret");
            let deriver = SignatureDeriver::new("ext");

            let id = || RequestId::from(request_id.as_str());
            let first = deriver.derive(&session, id(), page);
            let again = deriver.derive(&session, id(), page);
            let next_page = deriver.derive(&session, id(), page + 1);
            let other_id =
                deriver.derive(&session, RequestId::from(format!("{request_id}x")), page);

            prop_assert_eq!(&first.signature, &again.signature);
            prop_assert_ne!(&first.signature, &next_page.signature);
            prop_assert_ne!(&first.signature, &other_id.signature);
            prop_assert_eq!(first.signature.len(), 64);
            prop_assert!(first.signature.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }
    }

    // Property test: sorting reorders rows without losing any
    proptest! {
        #[test]
        fn test_sort_rows_is_ordered_permutation(
            rows in prop::collection::vec(("[a-zA-Z]{1,6}", 0u64..50), 0..15),
            descending in any::<bool>(),
        ) {
            let mut sorted: Vec<ReportRow> = rows
                .iter()
                .map(|(name, count)| ReportRow {
                    name: name.clone(),
                    count: *count,
                    image_url: String::new(),
                    days: vec![],
                    order_dates: vec![],
                })
                .collect();
            let direction = if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            sort_rows(&mut sorted, SortKey::Count, direction);

            prop_assert_eq!(sorted.len(), rows.len());
            for pair in sorted.windows(2) {
                if descending {
                    prop_assert!(pair[0].count >= pair[1].count);
                } else {
                    prop_assert!(pair[0].count <= pair[1].count);
                }
            }
        }
    }
}
