// Rolegate
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Property tests for local audit filtering and paging

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rolegate_client::audit::{AuditFilter, LocalPager, apply_filter};
use rolegate_client::models::{ActionKind, AuditLogEntry, Id};

const PAGES: [&str; 3] = ["Projects", "Skills", "Employees"];
const BASE_TS: i64 = 1_735_689_600; // 2025-01-01T00:00:00Z

fn ts(offset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_TS + offset, 0).unwrap()
}

fn kind_strategy() -> impl Strategy<Value = ActionKind> {
    (0usize..7).prop_map(|i| match ActionKind::KNOWN.get(i) {
        Some(kind) => kind.clone(),
        None => ActionKind::Other("ARCHIVE".to_string()),
    })
}

fn entry_strategy() -> impl Strategy<Value = AuditLogEntry> {
    (any::<i64>(), kind_strategy(), prop::option::of(0usize..3), 0i64..100_000).prop_map(|(id, kind, page, offset)| AuditLogEntry {
        id: Id::Num(id),
        user_name: None,
        user_email: None,
        action_page: page.map(|p| PAGES[p].to_string()),
        action_performed: kind,
        timestamp: ts(offset),
    })
}

fn filter_strategy() -> impl Strategy<Value = AuditFilter> {
    (
        prop::option::of(kind_strategy()),
        prop::option::of(0usize..3),
        prop::option::of(0i64..100_000),
        prop::option::of(0i64..100_000),
    )
        .prop_map(|(action_type, page, start, end)| AuditFilter {
            action_type,
            page_name: page.map(|p| PAGES[p].to_string()),
            start_date: start.map(ts),
            end_date: end.map(ts),
        })
}

fn expected_match(entry: &AuditLogEntry, filter: &AuditFilter) -> bool {
    filter.action_type.as_ref().is_none_or(|k| &entry.action_performed == k)
        && filter.page_name.as_ref().is_none_or(|p| entry.action_page.as_ref() == Some(p))
        && filter.start_date.is_none_or(|s| entry.timestamp >= s)
        && filter.end_date.is_none_or(|e| entry.timestamp <= e)
}

proptest! {
    #[test]
    fn filter_keeps_exactly_matching_records(
        records in prop::collection::vec(entry_strategy(), 0..120),
        filter in filter_strategy(),
    ) {
        let filtered = apply_filter(&records, &filter);
        let expected = records.iter().filter(|r| expected_match(r, &filter)).count();
        prop_assert_eq!(filtered.len(), expected);
        for record in &filtered {
            prop_assert!(records.contains(record));
            prop_assert!(expected_match(record, &filter));
        }
    }

    #[test]
    fn filtered_records_are_newest_first(
        records in prop::collection::vec(entry_strategy(), 0..120),
        filter in filter_strategy(),
    ) {
        let filtered = apply_filter(&records, &filter);
        prop_assert!(filtered.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn window_matches_page_bounds(
        len in 0usize..500,
        page_size in 1usize..60,
        moves in 0usize..20,
    ) {
        let items: Vec<usize> = (0..len).collect();
        let mut pager = LocalPager::new(page_size);
        pager.reset(len);
        for _ in 0..moves {
            pager.next_page();
        }

        let window = pager.window(&items);
        prop_assert!(window.len() <= page_size);
        let lower = (pager.current_page() - 1) * page_size;
        let upper = (pager.current_page() * page_size).min(len);
        prop_assert_eq!(window, &items[lower.min(upper)..upper]);
        prop_assert_eq!(pager.has_next(), pager.current_page() < pager.total_pages());
        prop_assert_eq!(pager.has_prev(), pager.current_page() > 1);
    }
}
