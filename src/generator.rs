//! Synthetic raw order generation.
//!
//! Produces daily raw order files per sales channel, in the exact layout the
//! ingestion driver consumes: `<out>/<YYYY-MM-DD>/<PREFIX>_orders.csv`, one
//! header row followed by one order per line.

use crate::constants::FIELD_NAMES;
use crate::error::{OrdersError, Result};
use crate::models::OrderRecord;

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ALL_COUNTRIES: &[&str] = &[
    "USA",
    "Canada",
    "France",
    "Germany",
    "UK",
    "Japan",
    "Australia",
    "Brazil",
    "India",
    "China",
];
const STATUSES: [&str; 2] = ["PAID", "CANCELLED"];

/// Sales channel, each with its own order distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Channel {
    /// Website orders (prefix WEB)
    Web,
    /// Mobile app orders (prefix MOB)
    Mobile,
    /// Partner resellers (prefix PART)
    Partner,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Web, Channel::Mobile, Channel::Partner];

    /// Prefix used in order ids and file names
    pub fn prefix(&self) -> &'static str {
        match self {
            Channel::Web => "WEB",
            Channel::Mobile => "MOB",
            Channel::Partner => "PART",
        }
    }

    /// Baseline daily volume before the day factor is applied
    pub fn default_orders_per_day(&self) -> usize {
        match self {
            Channel::Web => 170_000,
            Channel::Mobile | Channel::Partner => 165_000,
        }
    }

    /// Volume multipliers per simulated day, cycled when exhausted
    pub fn daily_factors(&self) -> &'static [f64] {
        match self {
            Channel::Web => &[1.3, 1.5, 0.9],
            Channel::Mobile => &[1.0],
            Channel::Partner => &[1.0, 1.2, 1.5, 0.6, 1.3],
        }
    }

    /// Raw file name for this channel
    pub fn file_name(&self) -> String {
        format!("{}_orders.csv", self.prefix())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Web => "web",
            Channel::Mobile => "mobile",
            Channel::Partner => "partner",
        };
        f.write_str(name)
    }
}

/// Summary of one generation run
#[derive(Debug, Default)]
pub struct GenerationStats {
    pub files_written: usize,
    pub orders_written: usize,
    pub files: Vec<PathBuf>,
}

/// Random order source for one channel
#[derive(Debug)]
pub struct OrderGenerator {
    channel: Channel,
    rng: StdRng,
    countries: &'static [&'static str],
    country_weights: Option<WeightedIndex<u32>>,
    status_weights: WeightedIndex<u32>,
    partner_products: Option<WeightedIndex<u32>>,
}

impl OrderGenerator {
    /// Create a generator; a seed makes the output reproducible
    pub fn new(channel: Channel, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (countries, country_weights, status_weights, partner_products): (
            &'static [&'static str],
            Option<Vec<u32>>,
            Vec<u32>,
            Option<Vec<u32>>,
        ) = match channel {
            Channel::Web => (
                &["France", "Canada", "Japan", "Germany", "UK"],
                Some(vec![35, 25, 20, 10, 10]),
                vec![85, 15],
                None,
            ),
            Channel::Mobile => (ALL_COUNTRIES, None, vec![85, 15], None),
            Channel::Partner => (
                &["USA", "UK", "Germany", "Canada", "France"],
                Some(vec![40, 25, 20, 10, 5]),
                vec![95, 5],
                Some(
                    (1000..3000)
                        .map(|id| if id % 100 == 0 { 5 } else { 1 })
                        .collect(),
                ),
            ),
        };

        Ok(Self {
            channel,
            rng,
            countries,
            country_weights: country_weights.map(weighted).transpose()?,
            status_weights: weighted(status_weights)?,
            partner_products: partner_products.map(weighted).transpose()?,
        })
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Draw one order for `date`, numbered `sequence`
    pub fn generate_order(&mut self, date: NaiveDate, sequence: u64) -> OrderRecord {
        let order_id = format!(
            "{}-{}-{}",
            self.channel.prefix(),
            date.format("%Y%m%d"),
            sequence
        );

        let country = match &self.country_weights {
            Some(weights) => self.countries[weights.sample(&mut self.rng)],
            None => self.countries[self.rng.gen_range(0..self.countries.len())],
        };

        let (client_id, product_id, quantity, unit_price) = match self.channel {
            Channel::Web => (
                self.rng.gen_range(30_000..=70_000),
                self.normal_product_id(),
                self.exponential_quantity(2.5),
                self.rng.gen_range(50.0..200.0),
            ),
            Channel::Mobile => (
                self.rng.gen_range(1..=100_000),
                self.rng.gen_range(1..=10_000),
                self.rng.gen_range(1..=10),
                self.rng.gen_range(5.0..500.0),
            ),
            Channel::Partner => {
                let product_id = match &self.partner_products {
                    Some(weights) => 1000 + weights.sample(&mut self.rng) as i64,
                    None => self.rng.gen_range(1000..3000),
                };
                (
                    self.rng.gen_range(1..=30_000),
                    product_id,
                    self.rng.gen_range(5..=20),
                    self.rng.gen_range(150.0..500.0),
                )
            }
        };

        let status = STATUSES[self.status_weights.sample(&mut self.rng)];

        OrderRecord {
            order_id,
            client_id,
            product_id,
            country: country.to_string(),
            order_date: date.format("%Y-%m-%d").to_string(),
            quantity,
            unit_price: round_cents(unit_price),
            status: status.to_string(),
        }
    }

    /// Write one raw file per day under `output_dir`.
    ///
    /// Order numbers continue across days; the day factor scales
    /// `orders_per_day` before truncation.
    pub fn write_days(
        &mut self,
        output_dir: &Path,
        start_date: NaiveDate,
        days: u32,
        orders_per_day: usize,
    ) -> Result<GenerationStats> {
        let mut stats = GenerationStats::default();
        let mut sequence: u64 = 1;
        let factors = self.channel.daily_factors();

        for day in 0..days {
            let date = start_date + Duration::days(i64::from(day));
            let factor = factors[day as usize % factors.len()];
            let daily_orders = (orders_per_day as f64 * factor) as usize;

            let day_dir = output_dir.join(date.format("%Y-%m-%d").to_string());
            fs::create_dir_all(&day_dir)?;
            let path = day_dir.join(self.channel.file_name());

            debug!(
                "Generating {} {} orders for {} into {}",
                daily_orders,
                self.channel,
                date,
                path.display()
            );

            let mut writer = BufWriter::new(File::create(&path)?);
            writeln!(writer, "{}", FIELD_NAMES.join(","))?;
            for offset in 0..daily_orders as u64 {
                let order = self.generate_order(date, sequence + offset);
                writeln!(writer, "{}", to_csv_line(&order))?;
            }
            writer.flush()?;
            sequence += daily_orders as u64;

            info!("Generated {} {} orders for {}", daily_orders, self.channel, date);
            stats.files_written += 1;
            stats.orders_written += daily_orders;
            stats.files.push(path);
        }

        Ok(stats)
    }

    /// Normal(5000, 300) truncated toward zero
    fn normal_product_id(&mut self) -> i64 {
        // Box-Muller; u1 is kept away from zero for the logarithm
        let u1: f64 = 1.0 - self.rng.gen_range(0.0..1.0);
        let u2: f64 = self.rng.gen_range(0.0..1.0);
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        (5000.0 + 300.0 * z) as i64
    }

    /// Exponential draw with the given mean, floored, plus one
    fn exponential_quantity(&mut self, mean: f64) -> i64 {
        let u: f64 = self.rng.gen_range(0.0..1.0);
        (-(1.0 - u).ln() * mean) as i64 + 1
    }
}

fn weighted(weights: Vec<u32>) -> Result<WeightedIndex<u32>> {
    WeightedIndex::new(weights).map_err(|e| OrdersError::Configuration {
        message: format!("Invalid channel weights: {}", e),
    })
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serialize an order back into the raw comma-separated layout
pub fn to_csv_line(order: &OrderRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        order.order_id,
        order.client_id,
        order.product_id,
        order.country,
        order.order_date,
        order.quantity,
        order.unit_price,
        order.status
    )
}
