//! Suggested actions and quick replies derived from the final reply text.

/// Lead words that introduce an action, matched case-insensitively.
const LEAD_WORDS: &[&str] = &["rekomendasi", "saran", "strategi", "action item"];

const DEFAULT_ACTIONS: &[&str] = &[
    "Analisis tren penjualan 30 hari terakhir",
    "Review performa channel pemasaran",
    "Evaluasi tingkat kepuasan pelanggan",
];

const SALES_REPLIES: &[&str] = &[
    "Tampilkan analisis tren penjualan",
    "Bandingkan performa bulan ini vs bulan lalu",
    "Rekomendasi untuk meningkatkan konversi",
    "Prediksi omzet bulan depan",
];

const CUSTOMER_REPLIES: &[&str] = &[
    "Segmentasi pelanggan",
    "Tingkat retensi pelanggan",
    "Strategi meningkatkan loyalitas",
    "Analisis churn rate",
];

const DEFAULT_REPLIES: &[&str] = &[
    "Tampilkan dashboard performa",
    "Analisis utilisasi armada",
    "Rekomendasi promosi",
    "Optimasi harga dinamis",
];

const SALES_KEYWORDS: &[&str] = &["penjualan", "omzet"];
const CUSTOMER_KEYWORDS: &[&str] = &["pelanggan"];

/// Extract actions from lines of the form `<lead word>[:] <action>`.
///
/// The lead word may start anywhere in a line, including mid-word; the
/// leftmost occurrence wins and everything after the separating space up to
/// the end of the line is the action. At most one action is taken per line.
/// Falls back to a fixed three-item list when nothing matches, so the result
/// is never empty.
pub fn suggested_actions(text: &str) -> Vec<String> {
    let actions: Vec<String> = text
        .split(['\n', '\r', '\u{2028}', '\u{2029}'])
        .filter_map(action_in_line)
        .map(str::to_string)
        .collect();

    if actions.is_empty() {
        DEFAULT_ACTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        actions
    }
}

fn action_in_line(line: &str) -> Option<&str> {
    line.char_indices()
        .find_map(|(start, _)| action_at(&line[start..]))
}

fn action_at(rest: &str) -> Option<&str> {
    LEAD_WORDS.iter().find_map(|lead| {
        let head = rest.get(..lead.len())?;
        if !head.eq_ignore_ascii_case(lead) {
            return None;
        }
        let after = &rest[lead.len()..];
        // The colon is optional; without it the space must follow directly.
        [after.strip_prefix(':'), Some(after)]
            .into_iter()
            .flatten()
            .find_map(|s| s.strip_prefix(' ').filter(|action| !action.is_empty()))
    })
}

/// Pick a fixed list of follow-up prompts by keyword.
///
/// Sales terms take precedence over customer terms.
pub fn quick_replies(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let replies: &[&str] = if mentions(SALES_KEYWORDS) {
        SALES_REPLIES
    } else if mentions(CUSTOMER_KEYWORDS) {
        CUSTOMER_REPLIES
    } else {
        DEFAULT_REPLIES
    };

    replies.iter().map(|s| s.to_string()).collect()
}
