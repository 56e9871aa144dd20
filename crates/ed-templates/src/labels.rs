//! Display strings for titles, tooltips and widget labels

use ed_core::Locale;

/// Every user-visible string of the dashboard in one language
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    pub country: String,
    pub year: String,
    pub country_picker: String,
    pub year_picker: String,
    pub renewables_axis: String,
    pub renewables_tooltip: String,
    pub co2_axis: String,
    pub co2_tooltip: String,
    pub price_legend: String,
    pub price_tooltip: String,
    pub delta_axis: String,
    pub delta_tooltip: String,
    pub line_description: String,
    pub scatter_description: String,
    pub heatmap_description: String,
    pub bars_description: String,
    pub page_title: String,
}

impl Labels {
    /// Labels for `locale`; `(first, last)` are the compared years
    pub fn new(locale: Locale, (first, last): (i64, i64)) -> Self {
        match locale {
            Locale::Hu => Self {
                country: "Ország".into(),
                year: "Év".into(),
                country_picker: "Ország: ".into(),
                year_picker: "Év: ".into(),
                renewables_axis: "Megújulók aránya (%)".into(),
                renewables_tooltip: "Megújulók (%)".into(),
                co2_axis: "CO₂ / fő (t)".into(),
                co2_tooltip: "CO₂/fő (t)".into(),
                price_legend: format!("Árindex ({}=100)", first),
                price_tooltip: "Árindex".into(),
                delta_axis: "Változás (százalékpont)".into(),
                delta_tooltip: "Változás (pp)".into(),
                line_description: "Megújulók aránya időben (országválasztóval).".into(),
                scatter_description: "CO2/fő vs megújulók aránya, év csúszkával.".into(),
                heatmap_description: "Energiaár index hőtérkép.".into(),
                bars_description: format!(
                    "Megújulók arányának változása {} és {} között.",
                    first, last
                ),
                page_title: "Energiaátmenet".into(),
            },
            Locale::En => Self {
                country: "Country".into(),
                year: "Year".into(),
                country_picker: "Country: ".into(),
                year_picker: "Year: ".into(),
                renewables_axis: "Renewables share (%)".into(),
                renewables_tooltip: "Renewables (%)".into(),
                co2_axis: "CO₂ per capita (t)".into(),
                co2_tooltip: "CO₂/capita (t)".into(),
                price_legend: format!("Price index ({}=100)", first),
                price_tooltip: "Price index".into(),
                delta_axis: "Change (percentage points)".into(),
                delta_tooltip: "Change (pp)".into(),
                line_description: "Renewables share over time (with country selector).".into(),
                scatter_description: "CO2 per capita vs renewables share, with year slider.".into(),
                heatmap_description: "Energy price index heatmap.".into(),
                bars_description: format!(
                    "Change in renewables share between {} and {}.",
                    first, last
                ),
                page_title: "Energy transition".into(),
            },
        }
    }

    /// Tooltip title of a pivoted year column
    pub fn share_in(&self, year: i64) -> String {
        format!("{} (%)", year)
    }
}
