//! System prompt rendering from live business metrics.
//!
//! Missing metrics never fail composition: counts fall back to `0`, labels
//! to `-`, and percentages to a bare `0`.

use chrono::NaiveDate;
use fleetwise_core::stats::{BusinessStats, ExtendedAnalytics};
use std::fmt::Write;

use super::locale::{format_date, format_percent, format_rupiah};

const ROLE: &str = "Kamu adalah AI Business Intelligence untuk rental mobil, namun kamu juga dapat membantu menjawab pertanyaan umum di luar topik rental mobil jika dibutuhkan.";

const GUIDELINES: &str = "\
- Jika pertanyaan berkaitan dengan rental mobil, jawab dengan analisis bisnis, strategi, dan insight data.
- Jika pertanyaan di luar rental mobil, jawab dengan pengetahuan umum terbaikmu.
- Jika tidak tahu jawabannya, katakan dengan jujur.";

const RESPONSE_FORMAT: &str = "\
1. **Analisis**: Insight berbasis data (jika relevan)
2. **Jawaban**: Jawab pertanyaan user sejelas mungkin
3. **Rekomendasi**: Jika relevan, berikan saran atau langkah lanjut";

/// Render the system prompt for `date` from whatever metrics are available.
pub fn compose_system_prompt(
    stats: Option<&BusinessStats>,
    analytics: Option<&ExtendedAnalytics>,
    date: NaiveDate,
) -> String {
    let mut prompt = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "# PERAN KAMU\n{ROLE}\n");
    let _ = writeln!(prompt, "# INFORMASI SISTEM\nTanggal: {}\n", format_date(date));
    let _ = writeln!(prompt, "## DATA BISNIS TERKINI\n{}", business_data(stats, analytics));
    let _ = writeln!(prompt, "# PETUNJUK\n{GUIDELINES}\n");
    let _ = write!(prompt, "# FORMAT RESPON\n{RESPONSE_FORMAT}");

    prompt
}

fn business_data(stats: Option<&BusinessStats>, analytics: Option<&ExtendedAnalytics>) -> String {
    let count = |v: Option<u64>| v.unwrap_or(0);
    let a = |f: fn(&ExtendedAnalytics) -> Option<f64>| analytics.and_then(f);

    let popular = analytics.and_then(ExtendedAnalytics::popular_car);
    let popular_model = popular
        .and_then(|c| c.model.as_deref())
        .filter(|m| !m.is_empty())
        .unwrap_or("-");
    let popular_count = popular.and_then(|c| c.count).unwrap_or(0);

    let peak = analytics.and_then(ExtendedAnalytics::peak_hour);
    let peak_hour = peak
        .and_then(|p| p.hour.as_ref())
        .filter(|h| !h.is_blank())
        .map_or_else(|| "-".to_string(), ToString::to_string);
    let peak_count = peak.and_then(|p| p.count).unwrap_or(0);

    let channels = analytics
        .map(|x| x.top_channels.join(", "))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "-".to_string());

    let lines = [
        format!("- Total Pesanan: {}", count(stats.and_then(|s| s.total_orders))),
        format!("- Omzet: {}", format_rupiah(stats.and_then(|s| s.total_revenue))),
        format!("- Rata-rata Pesanan: {}", format_rupiah(a(|x| x.avg_order_value))),
        format!("- Tingkat Konversi: {}%", format_percent(a(|x| x.conversion_rate))),
        format!("- Pertumbuhan Bulanan: {}%", format_percent(a(|x| x.monthly_growth))),
        format!("- Total Mobil: {}", count(stats.and_then(|s| s.total_cars))),
        format!("- Utilisasi: {}%", format_percent(a(|x| x.utilization_rate))),
        format!("- Ketersediaan: {}%", format_percent(a(|x| x.availability_rate))),
        format!("- Pelanggan Baru: {}", count(analytics.and_then(|x| x.new_customers))),
        format!("- Pelanggan Berulang: {}", count(analytics.and_then(|x| x.repeat_customers))),
        format!("- Tingkat Retensi: {}%", format_percent(a(|x| x.repeat_rate))),
        format!("- Mobil Populer: {popular_model} ({popular_count}x)"),
        format!("- Jam Sibuk: {peak_hour} ({peak_count} pesanan)"),
        format!("- Channel Efektif: {channels}"),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
