//! The daily report text.
//!
//! The format is fixed and human-readable; downstream tooling greps these
//! exact lines, so the wording is part of the contract.

use crate::stats::DistributionStats;

/// Render the previous-day summary.
///
/// With no stats only the header and a zero count are produced; otherwise a
/// totals block is followed by one detail line per distribution, in input
/// order.
#[must_use]
pub fn render_report(stats: &[DistributionStats]) -> String {
    let mut message = String::from("Статистика по рассылкам, запущенным за предыдущий день.\n\n");

    if stats.is_empty() {
        message.push_str("Всего рассылок: 0\n");
        return message;
    }

    let sent_total: usize = stats.iter().map(|stat| stat.sent).sum();
    message.push_str(&format!(
        "Всего рассылок: {}\nВсего отправлено сообщений: {sent_total}\n\nДетальный список:\n",
        stats.len(),
    ));

    for stat in stats {
        message.push_str(&format!(
            "- Рассылка #{}: Всего сообщений: {}, Отправлено: {}, Не отправлено: {}\n",
            stat.id, stat.total, stat.sent, stat.not_sent,
        ));
    }

    message
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use courier_store::DistributionId;
    use pretty_assertions::assert_eq;

    use super::*;

    fn stat(id: u64, total: usize, sent: usize) -> DistributionStats {
        DistributionStats {
            id: DistributionId(id),
            total,
            sent,
            not_sent: total - sent,
        }
    }

    #[test]
    fn report_totals_and_detail_lines() {
        let report = render_report(&[stat(1, 10, 7), stat(2, 15, 12)]);

        assert!(report.contains("Всего рассылок: 2"));
        assert!(report.contains("Всего отправлено сообщений: 19"));

        let first = report
            .find("- Рассылка #1: Всего сообщений: 10, Отправлено: 7, Не отправлено: 3")
            .expect("first detail line missing");
        let second = report
            .find("- Рассылка #2: Всего сообщений: 15, Отправлено: 12, Не отправлено: 3")
            .expect("second detail line missing");
        assert!(first < second, "detail lines must keep input order");
    }

    #[test]
    fn empty_stats_renders_only_the_zero_header() {
        let report = render_report(&[]);

        assert_eq!(
            report,
            "Статистика по рассылкам, запущенным за предыдущий день.\n\nВсего рассылок: 0\n"
        );
        assert!(!report.contains("Детальный список"));
    }
}
