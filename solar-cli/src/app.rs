//! Wiring between configuration, the core crates and the transport adapters.
//! Everything here is independent of clap so it can be tested directly.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use solar_core::calculations::{IrradianceBand, MapSummary, MapViewMode};
use solar_core::session::SessionStoreRegistry;
use solar_core::{
    AuthService, CityIrradiance, ContactService, EstimateError, EstimateInput, EstimateSummary,
    EstimatorConfig, RouteGuard, SavingsEstimator, SessionGate, SessionState,
};
use solar_data::{LoaderError, ReferenceData};
use solar_db_sqlite::SqliteStoreFactory;
use solar_http::{Backend, HttpAuthService, HttpContactService};
use tracing::{debug, warn};

use crate::config::SolarConfig;

/// Registry with every session store backend this binary ships.
pub fn build_registry() -> SessionStoreRegistry {
    let mut registry = SessionStoreRegistry::with_memory();
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Built-in reference tables, with any file overrides from `config`.
pub fn load_reference_data(config: &SolarConfig) -> Result<ReferenceData, LoaderError> {
    ReferenceData::load(config.tariffs_file.as_deref(), config.cities_file.as_deref())
}

/// One estimate as printed or serialized by the `estimate` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateReport {
    pub region: String,
    /// The figures the estimate was computed from.
    pub input: EstimateInput,
    /// True when the requested figures were outside the form's ranges and
    /// were pulled in.
    pub clamped: bool,
    pub summary: EstimateSummary,
}

/// Runs the estimator over `input`.
///
/// With `clamp` set, bill and roof area are first pulled into the ranges the
/// calculator form offers.
pub fn run_estimate(
    data: &ReferenceData,
    config: &EstimatorConfig,
    input: EstimateInput,
    clamp: bool,
) -> Result<EstimateReport, EstimateError> {
    let requested = input;
    let input = if clamp {
        requested.clamp_to_form_bounds()
    } else {
        requested.clone()
    };
    let clamped = input != requested;
    if clamped {
        warn!(
            bill = %requested.monthly_bill_amount,
            roof_area = %requested.available_roof_area,
            "inputs outside calculator ranges; clamped"
        );
    }

    let estimator = SavingsEstimator::new(&data.tariffs, config.clone());
    let result = estimator.compute_estimate(&input)?;
    let region = data
        .tariffs
        .get(&input.region_id)
        .map(|t| t.display_name.clone())
        .unwrap_or_else(|| input.region_id.clone());

    Ok(EstimateReport {
        region,
        input,
        clamped,
        summary: EstimateSummary::from(&result),
    })
}

/// One marker on the solar potential map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
    pub band: IrradianceBand,
    pub color: &'static str,
    pub radius: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapReport {
    pub mode: MapViewMode,
    pub markers: Vec<MapMarker>,
    pub summary: MapSummary,
}

impl MapReport {
    pub fn build(cities: &[CityIrradiance], mode: MapViewMode) -> Self {
        let markers = cities
            .iter()
            .map(|city| {
                let value = mode.value_of(city);
                let band = IrradianceBand::classify(city.irradiance);
                MapMarker {
                    city: city.city.clone(),
                    latitude: city.latitude,
                    longitude: city.longitude,
                    value,
                    band,
                    color: band.color(),
                    radius: mode.marker_radius(value),
                    description: city.description.clone(),
                }
            })
            .collect();

        Self {
            mode,
            markers,
            summary: MapSummary::from_cities(cities),
        }
    }
}

/// The remote services the admin and contact commands talk to.
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub contacts: Arc<dyn ContactService>,
}

impl Services {
    /// HTTP adapters pointed at the configured backend.
    pub fn http(config: &SolarConfig) -> Result<Self> {
        let url = config.backend_url()?;
        let backend = Backend::new(url, config.request_timeout())
            .with_context(|| format!("cannot set up client for '{url}'"))?;
        debug!(base = %backend.base_url(), "using backend");

        Ok(Self {
            auth: Arc::new(HttpAuthService::new(backend.clone())),
            contacts: Arc::new(HttpContactService::new(backend)),
        })
    }
}

/// Opens the configured session store and restores the gate from it.
pub async fn open_gate(
    config: &SolarConfig,
    registry: &SessionStoreRegistry,
    auth: Arc<dyn AuthService>,
) -> Result<SessionGate> {
    let store_config = config.store_config();
    let store = registry.create(&store_config).await.with_context(|| {
        format!(
            "cannot open '{}' session store at '{}'",
            store_config.backend, store_config.location
        )
    })?;
    Ok(SessionGate::restore(auth, store).await)
}

/// Fails when `state` already holds a session; the login entry point sends
/// signed-in admins to the dashboard instead.
pub fn ensure_signed_out(state: &SessionState) -> Result<()> {
    if let (Some(path), Some(identity)) = (RouteGuard::login_entry(state), state.identity()) {
        bail!(
            "already signed in as {} ({path}); run `solar logout` first",
            identity.email
        );
    }
    Ok(())
}
