//! Dashboard template
//!
//! Builds the four chart descriptors of the energy dashboard from a
//! [`DashboardConfig`]. Descriptors are plain values; nothing here talks to
//! a renderer.

pub mod charts;
pub mod labels;

use ed_core::{ChartDescriptor, ChartKind, DashboardConfig, EmbedOptions};
use tracing::debug;

pub use labels::Labels;

/// The built dashboard: charts in declaration order plus shared options
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub charts: Vec<ChartDescriptor>,
    pub embed_options: EmbedOptions,
}

impl Dashboard {
    pub fn chart(&self, kind: ChartKind) -> Option<&ChartDescriptor> {
        self.charts.iter().find(|c| c.kind == kind)
    }
}

/// Builds dashboards from a configuration
#[derive(Debug, Clone, Default)]
pub struct DashboardTemplate {
    config: DashboardConfig,
}

impl DashboardTemplate {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn labels(&self) -> Labels {
        Labels::new(self.config.locale, self.config.delta_years)
    }

    /// Build a single chart
    pub fn chart(&self, kind: ChartKind) -> ChartDescriptor {
        charts::build(kind, &self.config, &self.labels())
    }

    /// Build all four charts in declaration order
    pub fn build(&self) -> Dashboard {
        let labels = self.labels();
        let charts = ChartKind::ALL
            .into_iter()
            .map(|kind| charts::build(kind, &self.config, &labels))
            .collect::<Vec<_>>();
        debug!("Built {} chart descriptors for {}", charts.len(), self.config.data_url);

        Dashboard {
            charts,
            embed_options: self.config.embed_options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array, Int64Array, StringArray};
    use arrow::record_batch::RecordBatch;
    use ed_core::{FieldType, Literal, MountId, ParamBindings};
    use ed_data::{eval, CsvSource, NullConfig};
    use serde_json::json;
    use std::collections::HashSet;

    const DATA: &str = "\
country,year,renewables_share,co2_per_capita,energy_price_index
Romania,2010,23.4,3.9,100
Romania,2015,24.8,3.7,108
Romania,2024,27.1,3.3,151
Hungary,2010,8.6,4.9,100
Hungary,2015,14.5,4.4,97
Hungary,2024,19.3,4.0,163
Germany,2010,11.7,10.1,100
Germany,2015,14.9,9.6,112
Germany,2024,20.4,7.4,170
France,2010,12.7,5.6,100
France,2015,15.1,5.0,105
France,2024,22.3,4.3,142
Sweden,2010,45,5.6,100
Sweden,2015,53.3,4.3,95
Sweden,2024,68,3.4,121
";

    fn batch() -> RecordBatch {
        CsvSource::from_reader("data.csv", DATA.as_bytes(), &NullConfig::default())
            .unwrap()
            .batch()
            .clone()
    }

    fn texts(batch: &RecordBatch, name: &str) -> Vec<String> {
        let array = batch.column_by_name(name).unwrap();
        let strings = array.as_any().downcast_ref::<StringArray>().unwrap();
        strings.iter().map(|v| v.unwrap().to_string()).collect()
    }

    fn dashboard() -> Dashboard {
        DashboardTemplate::default().build()
    }

    #[test]
    fn test_charts_in_declaration_order_with_distinct_mounts() {
        let dashboard = dashboard();
        let kinds: Vec<_> = dashboard.charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());

        let mounts: HashSet<_> = dashboard.charts.iter().map(|c| c.target.clone()).collect();
        assert_eq!(mounts.len(), 4);
        assert_eq!(
            dashboard.chart(ChartKind::DeltaBars).unwrap().target,
            MountId::new("chartDeltaBars")
        );
    }

    #[test]
    fn test_every_chart_reads_the_configured_source() {
        let config = DashboardConfig {
            data_url: "energy/data.csv".into(),
            ..Default::default()
        };
        let dashboard = DashboardTemplate::new(config).build();
        for chart in &dashboard.charts {
            assert_eq!(chart.to_json().unwrap()["data"], json!({ "url": "energy/data.csv" }));
        }
    }

    #[test]
    fn test_line_chart_wire_form() {
        let line = dashboard().chart(ChartKind::TimeSeriesLine).unwrap().to_json().unwrap();
        assert_eq!(
            line,
            json!({
                "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
                "description": "Megújulók aránya időben (országválasztóval).",
                "width": "container",
                "height": 280,
                "data": { "url": "data.csv" },
                "params": [{
                    "name": "Country",
                    "value": "Romania",
                    "bind": {
                        "input": "select",
                        "options": ["Romania", "Hungary", "Germany", "France", "Sweden"],
                        "name": "Ország: "
                    }
                }],
                "transform": [{ "filter": "datum.country === Country" }],
                "mark": { "type": "line", "point": true },
                "encoding": {
                    "x": { "field": "year", "type": "quantitative", "title": "Év" },
                    "y": {
                        "field": "renewables_share",
                        "type": "quantitative",
                        "title": "Megújulók aránya (%)",
                        "scale": { "domain": [0, 80] }
                    },
                    "tooltip": [
                        { "field": "country", "title": "Ország" },
                        { "field": "year", "title": "Év" },
                        { "field": "renewables_share", "title": "Megújulók (%)" }
                    ]
                },
                "config": { "background": "transparent" }
            })
        );
    }

    #[test]
    fn test_scatter_params_and_highlight() {
        let scatter = dashboard().chart(ChartKind::YearScatter).unwrap().to_json().unwrap();
        assert_eq!(
            scatter["params"],
            json!([
                {
                    "name": "Year",
                    "value": 2024,
                    "bind": { "input": "range", "min": 2010, "max": 2024, "step": 1, "name": "Év: " }
                },
                {
                    "name": "Pick",
                    "select": { "type": "point", "fields": ["country"] },
                    "bind": "legend"
                }
            ])
        );
        assert_eq!(scatter["mark"], json!({ "type": "circle", "size": 180, "opacity": 0.9 }));
        assert_eq!(
            scatter["encoding"]["opacity"],
            json!({ "condition": { "param": "Pick", "value": 1 }, "value": 0.25 })
        );
    }

    #[test]
    fn test_heatmap_encoding() {
        let dashboard = dashboard();
        let heatmap = dashboard.chart(ChartKind::PriceHeatmap).unwrap();
        assert!(heatmap.params.is_empty());
        assert!(heatmap.transforms.is_empty());

        let color = heatmap.encoding.color.as_ref().unwrap();
        assert_eq!(color.field, "energy_price_index");
        let x = heatmap.encoding.x.as_ref().unwrap();
        assert_eq!((x.field.as_str(), x.field_type), ("year", Some(FieldType::Ordinal)));
    }

    #[test]
    fn test_delta_bars_wire_form() {
        let bars = dashboard().chart(ChartKind::DeltaBars).unwrap().to_json().unwrap();
        assert_eq!(
            bars["transform"],
            json!([
                { "filter": "datum.year === 2010 || datum.year === 2024" },
                { "pivot": "year", "value": "renewables_share", "groupby": ["country"] },
                { "calculate": "datum['2024'] - datum['2010']", "as": "delta" }
            ])
        );
        assert_eq!(
            bars["encoding"]["y"],
            json!({ "field": "country", "type": "nominal", "sort": "-x", "title": "Ország" })
        );
    }

    #[test]
    fn test_slider_range_does_not_move_delta_years() {
        let template = DashboardTemplate::new(DashboardConfig {
            year_range: (2015, 2024),
            default_year: 2020,
            ..Default::default()
        });
        let bars = template.chart(ChartKind::DeltaBars).to_json().unwrap();
        assert_eq!(bars["transform"][0]["filter"], "datum.year === 2010 || datum.year === 2024");

        let scatter = template.chart(ChartKind::YearScatter).to_json().unwrap();
        assert_eq!(scatter["params"][0]["bind"]["min"], 2015);
    }

    #[test]
    fn test_line_filter_follows_each_country() {
        let dashboard = dashboard();
        let line = dashboard.chart(ChartKind::TimeSeriesLine).unwrap();
        let data = batch();

        for country in &DashboardConfig::default().countries {
            let mut bindings = ParamBindings::defaults(&line.params);
            bindings.bind(&line.params, "Country", Literal::from(country.as_str())).unwrap();

            let rows = eval::preview(line, &data, &bindings).unwrap();
            assert_eq!(rows.num_rows(), 3);
            assert!(texts(&rows, "country").iter().all(|c| c == country));
        }
    }

    #[test]
    fn test_line_filter_defaults_to_romania() {
        let dashboard = dashboard();
        let line = dashboard.chart(ChartKind::TimeSeriesLine).unwrap();
        let rows = eval::preview(line, &batch(), &ParamBindings::defaults(&line.params)).unwrap();
        assert_eq!(texts(&rows, "country"), vec!["Romania"; 3]);
    }

    #[test]
    fn test_scatter_filter_by_year() {
        let dashboard = dashboard();
        let scatter = dashboard.chart(ChartKind::YearScatter).unwrap();
        let mut bindings = ParamBindings::defaults(&scatter.params);
        bindings.bind(&scatter.params, "Year", Literal::Int(2015)).unwrap();

        let rows = eval::preview(scatter, &batch(), &bindings).unwrap();
        let years = rows.column_by_name("year").unwrap();
        let years = years.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(rows.num_rows(), 5);
        assert!(years.iter().all(|y| y == Some(2015)));
    }

    #[test]
    fn test_selection_param_is_not_bindable() {
        let dashboard = dashboard();
        let scatter = dashboard.chart(ChartKind::YearScatter).unwrap();
        let mut bindings = ParamBindings::defaults(&scatter.params);
        assert!(bindings.bind(&scatter.params, "Pick", Literal::from("Sweden")).is_err());
    }

    #[test]
    fn test_delta_bars_sorted_descending() {
        let dashboard = dashboard();
        let bars = dashboard.chart(ChartKind::DeltaBars).unwrap();
        let rows = eval::preview(bars, &batch(), &ParamBindings::default()).unwrap();

        assert_eq!(
            texts(&rows, "country"),
            vec!["Sweden", "Hungary", "France", "Germany", "Romania"]
        );
        let delta = rows.column_by_name("delta").unwrap();
        let delta = delta.as_any().downcast_ref::<Float64Array>().unwrap();
        assert!((delta.value(0) - 23.0).abs() < 1e-9);
        let values: Vec<f64> = delta.iter().flatten().collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_english_labels() {
        let config = DashboardConfig {
            locale: ed_core::Locale::En,
            ..Default::default()
        };
        let heatmap = DashboardTemplate::new(config).chart(ChartKind::PriceHeatmap);
        let color = heatmap.encoding.color.unwrap();
        assert_eq!(color.title.as_deref(), Some("Price index (2010=100)"));
    }
}
