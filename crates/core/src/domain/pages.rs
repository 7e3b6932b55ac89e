// Page Range Parsing & Cost Calculation

use crate::domain::job::Priority;

/// Count the pages selected by a range spec such as `"1-3,5"`.
///
/// Tokens are comma-separated; each is a single page number or an inclusive
/// `start-end` range. A descending range counts the same as its ascending
/// twin (`"5-1"` -> 5). Malformed tokens contribute 0 rather than failing:
/// the kiosk UI sends whatever the user typed and the original service
/// priced only the parseable part.
pub fn count_pages(spec: &str) -> u32 {
    let mut count: u32 = 0;

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once('-') {
            let start = start.trim().parse::<i64>();
            let end = end.trim().parse::<i64>();
            if let (Ok(start), Ok(end)) = (start, end) {
                count += (end - start).unsigned_abs() as u32 + 1;
            }
        } else if token.parse::<i64>().is_ok() {
            count += 1;
        }
    }

    count
}

/// Cost of a job, fixed at creation: pages x per-page rate x priority
/// multiplier, rounded to two decimals (currency display precision).
pub fn job_cost(pages_count: u32, rate_per_page: f64, priority: Priority) -> f64 {
    let raw = pages_count as f64 * rate_per_page * priority.multiplier();
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ranges_and_singles() {
        assert_eq!(count_pages("1-3,5"), 4);
        assert_eq!(count_pages("1-3,5,7"), 5);
        assert_eq!(count_pages("2"), 1);
    }

    #[test]
    fn descending_range_counts_like_ascending() {
        assert_eq!(count_pages("5-1"), 5);
        assert_eq!(count_pages("3-3"), 1);
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        assert_eq!(count_pages("abc"), 0);
        assert_eq!(count_pages("1-3,abc,5"), 4);
        assert_eq!(count_pages("1-x"), 0);
        assert_eq!(count_pages(""), 0);
        assert_eq!(count_pages(" , ,"), 0);
    }

    #[test]
    fn cost_scenarios() {
        // rate 2/page, "1-3,5" -> 4 pages
        let pages = count_pages("1-3,5");
        assert_eq!(job_cost(pages, 2.0, Priority::Normal), 8.00);
        assert_eq!(job_cost(pages, 2.0, Priority::Urgent), 12.00);
    }

    #[test]
    fn cost_is_monotonic_in_pages() {
        let mut prev = 0.0;
        for pages in 1..50 {
            let cost = job_cost(pages, 1.75, Priority::Normal);
            assert!(cost > prev);
            prev = cost;
        }
    }

    #[test]
    fn urgent_is_exactly_one_and_a_half_times_normal() {
        for pages in [1u32, 4, 17, 120] {
            let normal = job_cost(pages, 2.0, Priority::Normal);
            let urgent = job_cost(pages, 2.0, Priority::Urgent);
            assert_eq!(urgent, (normal * 1.5 * 100.0).round() / 100.0);
        }
    }

    #[test]
    fn cost_rounds_to_two_decimals() {
        // 3 pages x 1.11 x 1.5 = 4.995 -> 5.00
        assert_eq!(job_cost(3, 1.11, Priority::Urgent), 5.0);
    }
}
