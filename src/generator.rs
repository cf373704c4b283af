//! Mock fleet generation
//!
//! Produces a plausible starting fleet: bins scattered around a reference
//! coordinate, a fixed roster of drivers, one route per targeted area, and a
//! week of historical collections. All randomness comes from the caller's
//! RNG so a seeded source gives a reproducible fleet.

use {
    crate::model::{
        predict_full_time, Bin, BinLocation, BinStatus, CollectionRecord, Driver, DriverStatus,
        GeoPoint, Route, RouteStatus, BIN_CAPACITY_LITRES,
    },
    chrono::{DateTime, Duration, Utc},
    rand::Rng,
};

const STREETS: [&str; 4] = ["Main St", "Oak Ave", "Pine Rd", "Cedar Blvd"];

/// Generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub bin_count: usize,
    pub collection_history: usize,
    /// Centre of the service area
    pub reference: GeoPoint,
    /// Width of the bounding box around `reference`, in degrees
    pub spread_degrees: f64,
    pub areas: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bin_count: 12,
            collection_history: 20,
            reference: GeoPoint { lat: 40.7128, lng: -74.0060 },
            spread_degrees: 0.1,
            areas: [
                "Downtown",
                "Residential North",
                "Industrial Zone",
                "Park District",
                "Shopping Center",
            ]
            .iter()
            .map(|a| a.to_string())
            .collect(),
        }
    }
}

/// A complete generated fleet, handed to the store
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    pub bins: Vec<Bin>,
    pub drivers: Vec<Driver>,
    pub routes: Vec<Route>,
    pub collections: Vec<CollectionRecord>,
}

/// A route the generator creates when its area has bins assigned
struct RoutePlan {
    id: &'static str,
    name: &'static str,
    area: &'static str,
    driver_id: &'static str,
    estimated_duration: u32,
    distance: f64,
    status: RouteStatus,
    started_hours_ago: Option<i64>,
}

const ROUTE_PLANS: [RoutePlan; 2] = [
    RoutePlan {
        id: "route-1",
        name: "Downtown Route",
        area: "Downtown",
        driver_id: "driver-1",
        estimated_duration: 120,
        distance: 15.5,
        status: RouteStatus::InProgress,
        started_hours_ago: Some(2),
    },
    RoutePlan {
        id: "route-2",
        name: "North Residential",
        area: "Residential North",
        driver_id: "driver-2",
        estimated_duration: 90,
        distance: 12.3,
        status: RouteStatus::Pending,
        started_hours_ago: None,
    },
];

pub struct FleetGenerator {
    config: GeneratorConfig,
}

impl FleetGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate a fresh fleet
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Fleet {
        let bins = self.generate_bins(rng, now);
        let drivers = generate_drivers();
        let routes = generate_routes(&bins, now);
        let collections = self.generate_collections(rng, &bins, &drivers, now);

        log::info!(
            "Generated fleet: {} bins, {} drivers, {} routes, {} historical collections",
            bins.len(),
            drivers.len(),
            routes.len(),
            collections.len()
        );

        Fleet { bins, drivers, routes, collections }
    }

    pub fn generate_bins<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Vec<Bin> {
        let config = &self.config;
        let mut bins = Vec::with_capacity(config.bin_count);

        for i in 1..=config.bin_count {
            let fill_level = rng.gen_range(0..100) as f64;
            let area = if config.areas.is_empty() {
                "Unassigned".to_string()
            } else {
                config.areas[rng.gen_range(0..config.areas.len())].clone()
            };

            let lat = config.reference.lat + (rng.gen::<f64>() - 0.5) * config.spread_degrees;
            let lng = config.reference.lng + (rng.gen::<f64>() - 0.5) * config.spread_degrees;
            let address = format!(
                "{} {}",
                rng.gen_range(0..9999),
                STREETS[rng.gen_range(0..STREETS.len())]
            );

            let daily_fill_rate = rng.gen_range(5.0..20.0);
            let last_updated = now - Duration::hours(rng.gen_range(0..2));
            // A bin cannot have been emptied after its last report
            let last_emptied = (now - Duration::days(rng.gen_range(0..7))).min(last_updated);

            let battery_level = rng.gen_range(60..100) as f64;
            let temperature = rng.gen_range(15..30) as f64;

            bins.push(Bin {
                id: format!("bin-{}", i),
                location: BinLocation { lat, lng, address, area },
                fill_level,
                capacity: BIN_CAPACITY_LITRES,
                last_emptied,
                last_updated,
                sensor_id: format!("ESP32-{:03}", i),
                status: BinStatus::from_fill_level(fill_level),
                predicted_full_time: predict_full_time(fill_level, daily_fill_rate, now),
                battery_level: Some(battery_level),
                temperature: Some(temperature),
                daily_fill_rate,
            });
        }

        bins
    }

    pub fn generate_collections<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        bins: &[Bin],
        drivers: &[Driver],
        now: DateTime<Utc>,
    ) -> Vec<CollectionRecord> {
        if bins.is_empty() || drivers.is_empty() {
            return Vec::new();
        }

        (0..self.config.collection_history)
            .map(|i| CollectionRecord {
                id: format!("collection-{}", i),
                bin_id: bins[rng.gen_range(0..bins.len())].id.clone(),
                driver_id: drivers[rng.gen_range(0..drivers.len())].id.clone(),
                collected_at: now - Duration::days(rng.gen_range(0..7)),
                fill_level_before: rng.gen_range(60..100) as f64,
                waste_amount: rng.gen_range(20..70),
                notes: None,
            })
            .collect()
    }
}

impl Default for FleetGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

/// Fixed driver roster
pub fn generate_drivers() -> Vec<Driver> {
    let roster = [
        (
            "driver-1",
            "Mike Johnson",
            "mike",
            "+1-555-0101",
            "CDL-A-12345",
            vec!["route-1"],
            DriverStatus::OnRoute,
        ),
        (
            "driver-2",
            "Sarah Williams",
            "sarah",
            "+1-555-0102",
            "CDL-A-67890",
            vec!["route-2"],
            DriverStatus::Available,
        ),
        (
            "driver-3",
            "Tom Brown",
            "tom",
            "+1-555-0103",
            "CDL-A-11111",
            vec![],
            DriverStatus::Break,
        ),
    ];

    roster
        .into_iter()
        .map(|(id, name, mailbox, phone, license, routes, status)| Driver {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@edust.com", mailbox),
            phone: phone.to_string(),
            license_number: license.to_string(),
            assigned_routes: routes.into_iter().map(String::from).collect(),
            status,
            current_location: None,
        })
        .collect()
}

/// One route per planned area, holding that area's bins in generation order
pub fn generate_routes(bins: &[Bin], now: DateTime<Utc>) -> Vec<Route> {
    ROUTE_PLANS
        .iter()
        .map(|plan| Route {
            id: plan.id.to_string(),
            name: plan.name.to_string(),
            bins: bins
                .iter()
                .filter(|b| b.location.area == plan.area)
                .map(|b| b.id.clone())
                .collect(),
            driver_id: Some(plan.driver_id.to_string()),
            estimated_duration: plan.estimated_duration,
            distance: plan.distance,
            optimized: true,
            status: plan.status,
            start_time: plan.started_hours_ago.map(|h| now - Duration::hours(h)),
            completed_time: None,
        })
        .collect()
}
