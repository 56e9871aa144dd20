//! Builders for the four dashboard charts

use ed_core::{
    Channel, ChartDescriptor, ChartKind, ConditionalValue, DashboardConfig, DataRef, Encoding, Expr, FieldDef,
    FieldType, Literal, Mark, MarkType, Param, Predicate, Scale, Sort, Transform, ViewConfig, Width,
    VEGA_LITE_SCHEMA,
};

use crate::labels::Labels;

/// Field names of the data set
pub mod fields {
    pub const COUNTRY: &str = "country";
    pub const YEAR: &str = "year";
    pub const RENEWABLES_SHARE: &str = "renewables_share";
    pub const CO2_PER_CAPITA: &str = "co2_per_capita";
    pub const ENERGY_PRICE_INDEX: &str = "energy_price_index";
    pub const DELTA: &str = "delta";
}

/// Parameter names
pub mod params {
    pub const COUNTRY: &str = "Country";
    pub const YEAR: &str = "Year";
    pub const PICK: &str = "Pick";
}

const CHART_HEIGHT: u32 = 280;
const RENEWABLES_DOMAIN: (i64, i64) = (0, 80);
const SCATTER_POINT_SIZE: u32 = 180;
const SCATTER_OPACITY: f64 = 0.9;
const PICKED_OPACITY: i64 = 1;
const UNPICKED_OPACITY: f64 = 0.25;

/// Build the descriptor of `kind`
pub fn build(kind: ChartKind, config: &DashboardConfig, labels: &Labels) -> ChartDescriptor {
    match kind {
        ChartKind::TimeSeriesLine => renewables_line(config, labels),
        ChartKind::YearScatter => co2_scatter(config, labels),
        ChartKind::PriceHeatmap => price_heatmap(config, labels),
        ChartKind::DeltaBars => delta_bars(config, labels),
    }
}

fn base(kind: ChartKind, config: &DashboardConfig, description: &str, mark: Mark, encoding: Encoding) -> ChartDescriptor {
    ChartDescriptor {
        kind,
        target: config.mounts.get(kind).clone(),
        schema: VEGA_LITE_SCHEMA.to_string(),
        description: description.to_string(),
        width: Width::Container,
        height: CHART_HEIGHT,
        data: DataRef {
            url: config.data_url.clone(),
        },
        params: Vec::new(),
        transforms: Vec::new(),
        mark,
        encoding,
        config: ViewConfig::default(),
    }
}

/// Renewables share over time for the country picked in a dropdown
pub fn renewables_line(config: &DashboardConfig, labels: &Labels) -> ChartDescriptor {
    let encoding = Encoding {
        x: Some(FieldDef::new(fields::YEAR, FieldType::Quantitative).title(&labels.year)),
        y: Some(
            FieldDef::new(fields::RENEWABLES_SHARE, FieldType::Quantitative)
                .title(&labels.renewables_axis)
                .scale(Scale::domain(RENEWABLES_DOMAIN.0, RENEWABLES_DOMAIN.1)),
        ),
        tooltip: vec![
            FieldDef::tooltip(fields::COUNTRY, &labels.country),
            FieldDef::tooltip(fields::YEAR, &labels.year),
            FieldDef::tooltip(fields::RENEWABLES_SHARE, &labels.renewables_tooltip),
        ],
        ..Default::default()
    };

    let mut chart = base(
        ChartKind::TimeSeriesLine,
        config,
        &labels.line_description,
        Mark::new(MarkType::Line).with_points(),
        encoding,
    );
    chart.params = vec![Param::select_input(
        params::COUNTRY,
        config.default_country.as_str(),
        config.countries.iter().map(|c| Literal::from(c.as_str())).collect(),
        &labels.country_picker,
    )];
    chart.transforms = vec![Transform::filter(Predicate::field_equals_param(
        fields::COUNTRY,
        params::COUNTRY,
    ))];
    chart
}

/// CO2 per capita against renewables share for the year on a slider;
/// clicking a legend entry highlights that country
pub fn co2_scatter(config: &DashboardConfig, labels: &Labels) -> ChartDescriptor {
    let encoding = Encoding {
        x: Some(FieldDef::new(fields::RENEWABLES_SHARE, FieldType::Quantitative).title(&labels.renewables_axis)),
        y: Some(FieldDef::new(fields::CO2_PER_CAPITA, FieldType::Quantitative).title(&labels.co2_axis)),
        color: Some(FieldDef::new(fields::COUNTRY, FieldType::Nominal).title(&labels.country)),
        opacity: Some(ConditionalValue::when_selected(
            params::PICK,
            PICKED_OPACITY,
            UNPICKED_OPACITY,
        )),
        tooltip: vec![
            FieldDef::tooltip(fields::COUNTRY, &labels.country),
            FieldDef::tooltip(fields::YEAR, &labels.year),
            FieldDef::tooltip(fields::RENEWABLES_SHARE, &labels.renewables_tooltip),
            FieldDef::tooltip(fields::CO2_PER_CAPITA, &labels.co2_tooltip),
        ],
    };

    let mut chart = base(
        ChartKind::YearScatter,
        config,
        &labels.scatter_description,
        Mark::new(MarkType::Circle).size(SCATTER_POINT_SIZE).opacity(SCATTER_OPACITY),
        encoding,
    );
    let (first, last) = config.year_range;
    chart.params = vec![
        Param::range_input(params::YEAR, config.default_year, (first, last, 1), &labels.year_picker),
        Param::legend_point(params::PICK, &[fields::COUNTRY]),
    ];
    chart.transforms = vec![Transform::filter(Predicate::field_equals_param(
        fields::YEAR,
        params::YEAR,
    ))];
    chart
}

/// Energy price index by country and year
pub fn price_heatmap(config: &DashboardConfig, labels: &Labels) -> ChartDescriptor {
    let encoding = Encoding {
        x: Some(FieldDef::new(fields::YEAR, FieldType::Ordinal).title(&labels.year)),
        y: Some(FieldDef::new(fields::COUNTRY, FieldType::Nominal).title(&labels.country)),
        color: Some(FieldDef::new(fields::ENERGY_PRICE_INDEX, FieldType::Quantitative).title(&labels.price_legend)),
        tooltip: vec![
            FieldDef::tooltip(fields::COUNTRY, &labels.country),
            FieldDef::tooltip(fields::YEAR, &labels.year),
            FieldDef::tooltip(fields::ENERGY_PRICE_INDEX, &labels.price_tooltip),
        ],
        ..Default::default()
    };

    base(
        ChartKind::PriceHeatmap,
        config,
        &labels.heatmap_description,
        Mark::new(MarkType::Rect),
        encoding,
    )
}

/// Change of renewables share between the two compared years, one bar per
/// country, largest gain on top
pub fn delta_bars(config: &DashboardConfig, labels: &Labels) -> ChartDescriptor {
    let (first, last) = config.delta_years;
    let (first_key, last_key) = (first.to_string(), last.to_string());

    let encoding = Encoding {
        y: Some(
            FieldDef::new(fields::COUNTRY, FieldType::Nominal)
                .sort(Sort::ByChannel {
                    channel: Channel::X,
                    descending: true,
                })
                .title(&labels.country),
        ),
        x: Some(FieldDef::new(fields::DELTA, FieldType::Quantitative).title(&labels.delta_axis)),
        tooltip: vec![
            FieldDef::tooltip(fields::COUNTRY, &labels.country),
            FieldDef::tooltip(first_key.as_str(), labels.share_in(first)),
            FieldDef::tooltip(last_key.as_str(), labels.share_in(last)),
            FieldDef::tooltip(fields::DELTA, &labels.delta_tooltip),
        ],
        ..Default::default()
    };

    let mut chart = base(
        ChartKind::DeltaBars,
        config,
        &labels.bars_description,
        Mark::new(MarkType::Bar),
        encoding,
    );
    chart.transforms = vec![
        Transform::filter(Predicate::field_in(fields::YEAR, [Literal::Int(first), Literal::Int(last)])),
        Transform::pivot(fields::YEAR, fields::RENEWABLES_SHARE, &[fields::COUNTRY]),
        Transform::calculate(Expr::difference(last_key, first_key), fields::DELTA),
    ];
    chart
}
