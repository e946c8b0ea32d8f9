//! Deterministic footers appended to every generated reply.

use fleetwise_core::stats::{BusinessStats, ExtendedAnalytics};

use crate::context::locale::{format_percent, format_rupiah};

const STRATEGY_FOOTER: &str = "\n💡 Strategi Implementasi:\n\
1. Tetapkan target spesifik (contoh: tingkatkan konversi 5% dalam 1 bulan)\n\
2. Monitor metrik kunci harian/mingguan\n\
3. Lakukan A/B testing untuk optimasi\n";

/// Append the "Data Referensi" block (when `stats` is known) and the
/// strategy block (always).
///
/// Applied to whatever text the completion gateway produced, apology
/// included.
pub fn enhance(
    text: &str,
    stats: Option<&BusinessStats>,
    analytics: Option<&ExtendedAnalytics>,
) -> String {
    let mut enhanced = String::from(text);

    if let Some(stats) = stats {
        enhanced.push_str("\n\n📊 Data Referensi:\n");
        enhanced.push_str(&format!(
            "- Total Pesanan: {}\n",
            stats.total_orders.unwrap_or(0)
        ));
        enhanced.push_str(&format!(
            "- Total Omzet: {}\n",
            format_rupiah(stats.total_revenue)
        ));

        let conversion = analytics
            .and_then(|a| a.conversion_rate)
            .filter(|r| *r != 0.0);
        if let Some(rate) = conversion {
            enhanced.push_str(&format!(
                "- Tingkat Konversi: {}%\n",
                format_percent(Some(rate))
            ));
        }
    }

    enhanced.push_str(STRATEGY_FOOTER);
    enhanced
}
