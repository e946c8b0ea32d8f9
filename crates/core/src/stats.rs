//! Business metrics as supplied by the admin backend.
//!
//! Every field is optional: the backend omits what it cannot compute and the
//! caller may hand in a partial object as request context. Numeric fields
//! accept JSON numbers or numeric strings, since aggregate columns often come
//! back from SQL as decimal strings. A field of the wrong shape reads as absent
//! (or as an empty list) rather than failing the whole object.

use serde::{Deserialize, Serialize};

/// Aggregate operational counts and revenue for the current period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessStats {
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<u64>,

    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,

    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_cars: Option<u64>,

    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub rented_cars: Option<u64>,
}

/// Secondary metrics: raw analytics fields plus rates derived from them.
///
/// Rates are ratios in `0.0..` (not percentages). Fields the analytics
/// endpoint sends that are not modelled here are kept in `extra` and passed
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedAnalytics {
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub website_visitors: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub rented_cars: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_cars: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub new_customers: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub repeat_customers: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_customers: Option<u64>,

    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub avg_order_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub monthly_growth: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub availability_rate: Option<f64>,

    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub utilization_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub repeat_rate: Option<f64>,

    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub popular_cars: Vec<PopularCar>,
    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub peak_hours: Vec<PeakHour>,
    #[serde(default, deserialize_with = "lenient::labels", skip_serializing_if = "Vec::is_empty")]
    pub top_channels: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ExtendedAnalytics {
    /// Fill in conversion, utilization and repeat rates from the raw counts.
    ///
    /// Missing numerators count as zero and every denominator is floored at
    /// one, so the result is always finite.
    pub fn with_derived_rates(mut self) -> Self {
        self.conversion_rate = Some(ratio(self.total_orders, self.website_visitors));
        self.utilization_rate = Some(ratio(self.rented_cars, self.total_cars));
        self.repeat_rate = Some(ratio(self.repeat_customers, self.total_customers));
        self
    }

    /// The most frequently rented car, if any were reported.
    pub fn popular_car(&self) -> Option<&PopularCar> {
        self.popular_cars.first()
    }

    /// The busiest ordering hour, if any were reported.
    pub fn peak_hour(&self) -> Option<&PeakHour> {
        self.peak_hours.first()
    }
}

fn ratio(numerator: Option<u64>, denominator: Option<u64>) -> f64 {
    let denominator = denominator.unwrap_or(0).max(1);
    numerator.unwrap_or(0) as f64 / denominator as f64
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopularCar {
    #[serde(default, deserialize_with = "lenient::label", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakHour {
    #[serde(default, deserialize_with = "lenient::hour", skip_serializing_if = "Option::is_none")]
    pub hour: Option<HourLabel>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// An hour of day, reported either as a number (`14`) or a label (`"14:00"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HourLabel {
    Number(serde_json::Number),
    Text(String),
}

impl HourLabel {
    /// A zero hour or an empty label carries no information.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(n) => n.as_f64() == Some(0.0),
            Self::Text(s) => s.is_empty(),
        }
    }
}

impl std::fmt::Display for HourLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Deserializers that accept numbers, numeric strings, and null, and read
/// anything of the wrong shape as absent.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::HourLabel;

    fn as_f64(value: Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Value>::deserialize(deserializer)?.and_then(as_f64))
    }

    pub fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Value>::deserialize(deserializer)?
            .and_then(as_f64)
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u64))
    }

    /// Strings as-is, numbers in their JSON form.
    fn as_label(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Value>::deserialize(deserializer)?.and_then(as_label))
    }

    pub fn hour<'de, D>(deserializer: D) -> Result<Option<HourLabel>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => Some(HourLabel::Number(n)),
            Some(Value::String(s)) => Some(HourLabel::Text(s)),
            _ => None,
        })
    }

    fn array<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        })
    }

    /// A list whose malformed entries are skipped. Null or a non-array is empty.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(array(deserializer)?
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    pub fn labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(array(deserializer)?.into_iter().filter_map(as_label).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_from_camel_case_json() {
        let stats: BusinessStats =
            serde_json::from_str(r#"{"totalOrders": 10, "totalRevenue": 5000000}"#).unwrap();
        assert_eq!(stats.total_orders, Some(10));
        assert_eq!(stats.total_revenue, Some(5_000_000.0));
        assert_eq!(stats.total_cars, None);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let stats: BusinessStats =
            serde_json::from_str(r#"{"totalOrders": "12", "totalRevenue": "1250000.50", "totalCars": null}"#)
                .unwrap();
        assert_eq!(stats.total_orders, Some(12));
        assert_eq!(stats.total_revenue, Some(1_250_000.5));
        assert_eq!(stats.total_cars, None);
    }

    #[test]
    fn garbage_numbers_become_absent() {
        let stats: BusinessStats =
            serde_json::from_str(r#"{"totalOrders": "lots", "totalRevenue": {}}"#).unwrap();
        assert_eq!(stats, BusinessStats::default());
    }

    #[test]
    fn derived_rates_floor_denominators() {
        let analytics = ExtendedAnalytics {
            total_orders: Some(30),
            website_visitors: Some(600),
            rented_cars: Some(4),
            total_cars: Some(0),
            repeat_customers: Some(0),
            total_customers: Some(0),
            ..Default::default()
        }
        .with_derived_rates();

        assert_eq!(analytics.conversion_rate, Some(0.05));
        // 4 / max(0, 1)
        assert_eq!(analytics.utilization_rate, Some(4.0));
        assert_eq!(analytics.repeat_rate, Some(0.0));
    }

    #[test]
    fn derived_rates_with_nothing_reported_are_zero() {
        let analytics = ExtendedAnalytics::default().with_derived_rates();
        for rate in [
            analytics.conversion_rate,
            analytics.utilization_rate,
            analytics.repeat_rate,
        ] {
            let rate = rate.unwrap();
            assert!(rate.is_finite());
            assert_eq!(rate, 0.0);
        }
    }

    #[test]
    fn unknown_fields_pass_through() {
        let analytics: ExtendedAnalytics = serde_json::from_str(
            r#"{"newCustomers": 3, "churnRate": 0.1, "peakHours": [{"hour": "19:00", "count": 8}]}"#,
        )
        .unwrap();
        assert_eq!(analytics.new_customers, Some(3));
        assert!(analytics.extra.contains_key("churnRate"));
        assert_eq!(
            analytics.peak_hour().unwrap().hour,
            Some(HourLabel::Text("19:00".into()))
        );

        let json = serde_json::to_value(&analytics).unwrap();
        assert_eq!(json["churnRate"], 0.1);
    }

    #[test]
    fn numeric_hour_label() {
        let peak: PeakHour = serde_json::from_str(r#"{"hour": 14, "count": 5}"#).unwrap();
        assert_eq!(peak.hour.unwrap().to_string(), "14");

        let peak: PeakHour = serde_json::from_str(r#"{"hour": 14.5}"#).unwrap();
        assert_eq!(peak.hour.unwrap().to_string(), "14.5");

        let peak: PeakHour = serde_json::from_str(r#"{"hour": true, "count": 2}"#).unwrap();
        assert_eq!(peak.hour, None);
        assert_eq!(peak.count, Some(2));
    }

    #[test]
    fn zero_hour_and_empty_label_are_blank() {
        assert!(HourLabel::Number(0u64.into()).is_blank());
        assert!(HourLabel::Text(String::new()).is_blank());
        assert!(!HourLabel::Number(7u64.into()).is_blank());
        assert!(!HourLabel::Text("00:00".into()).is_blank());
    }

    #[test]
    fn null_lists_keep_the_rest_of_the_analytics() {
        let analytics: ExtendedAnalytics = serde_json::from_str(
            r#"{"totalOrders": 20, "websiteVisitors": 400, "popularCars": null,
                "peakHours": {"hour": 9}, "topChannels": "Instagram"}"#,
        )
        .unwrap();
        assert_eq!(analytics.total_orders, Some(20));
        assert_eq!(analytics.website_visitors, Some(400));
        assert!(analytics.popular_cars.is_empty());
        assert!(analytics.peak_hours.is_empty());
        assert!(analytics.top_channels.is_empty());
    }

    #[test]
    fn malformed_list_entries_are_skipped() {
        let analytics: ExtendedAnalytics = serde_json::from_str(
            r#"{"popularCars": ["Avanza", {"model": "Toyota Avanza", "count": "18"}, {"model": 86}],
                "peakHours": [3, {"hour": "19:00"}],
                "topChannels": ["Instagram", null, {"name": "x"}, 2024]}"#,
        )
        .unwrap();
        assert_eq!(
            analytics.popular_cars,
            vec![
                PopularCar {
                    model: Some("Toyota Avanza".into()),
                    count: Some(18),
                },
                PopularCar {
                    model: Some("86".into()),
                    count: None,
                },
            ]
        );
        assert_eq!(
            analytics.peak_hour().unwrap().hour,
            Some(HourLabel::Text("19:00".into()))
        );
        assert_eq!(analytics.top_channels, vec!["Instagram", "2024"]);
    }
}
