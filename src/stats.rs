//! Power/cost summaries over a device list. Pure reducers with no temporal
//! behavior; the backdrop only reads the computed numbers for its HUD panel.
//! Inputs are taken at face value: negative or non-finite powers propagate
//! arithmetically.

pub(crate) const DEFAULT_RATE: f64 = 0.12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeviceKind {
    Hvac,
    Appliance,
    Other,
}

impl DeviceKind {
    /// Expected steady-state draw for maintenance comparison.
    pub(crate) fn baseline_w(self) -> f64 {
        match self {
            DeviceKind::Hvac => 2400.0,
            DeviceKind::Appliance => 150.0,
            DeviceKind::Other => 50.0,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Device {
    pub(crate) name: &'static str,
    pub(crate) kind: DeviceKind,
    pub(crate) power_w: f64,
    pub(crate) is_on: bool,
}

pub(crate) fn total_active_power(devices: &[Device]) -> f64 {
    devices
        .iter()
        .filter(|d| d.is_on)
        .map(|d| d.power_w)
        .sum()
}

pub(crate) fn daily_energy_kwh(devices: &[Device]) -> f64 {
    total_active_power(devices) / 1000.0 * 24.0
}

pub(crate) fn daily_cost(devices: &[Device], rate: f64) -> f64 {
    daily_energy_kwh(devices) * rate
}

pub(crate) fn monthly_cost(devices: &[Device], rate: f64) -> f64 {
    daily_cost(devices, rate) * 30.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Recommendation {
    Healthy,
    Monitor,
    ServiceSoon,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct MaintenanceReport {
    pub(crate) deviation: f64,
    pub(crate) needs_maintenance: bool,
    /// Percent, capped at 95.
    pub(crate) confidence: f64,
    pub(crate) recommendation: Recommendation,
}

/// Flag devices whose draw strays from the per-kind baseline. Deviation over
/// 15% warrants monitoring, over 25% a service visit.
pub(crate) fn maintenance(device: &Device) -> MaintenanceReport {
    let baseline = device.kind.baseline_w();
    let deviation = (device.power_w - baseline).abs() / baseline;
    let needs_maintenance = deviation > 0.15;
    let confidence = (60.0 + deviation * 100.0).min(95.0);
    let recommendation = if deviation > 0.25 {
        Recommendation::ServiceSoon
    } else if deviation > 0.15 {
        Recommendation::Monitor
    } else {
        Recommendation::Healthy
    };
    MaintenanceReport {
        deviation,
        needs_maintenance,
        confidence,
        recommendation,
    }
}

/// Demo fleet backing the HUD panel; there is no external data source.
pub(crate) fn demo_fleet() -> Vec<Device> {
    vec![
        Device {
            name: "hvac",
            kind: DeviceKind::Hvac,
            power_w: 2650.0,
            is_on: true,
        },
        Device {
            name: "fridge",
            kind: DeviceKind::Appliance,
            power_w: 140.0,
            is_on: true,
        },
        Device {
            name: "washer",
            kind: DeviceKind::Appliance,
            power_w: 480.0,
            is_on: false,
        },
        Device {
            name: "router",
            kind: DeviceKind::Other,
            power_w: 18.0,
            is_on: true,
        },
        Device {
            name: "lamp",
            kind: DeviceKind::Other,
            power_w: 60.0,
            is_on: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_devices() -> Vec<Device> {
        vec![
            Device {
                name: "a",
                kind: DeviceKind::Other,
                power_w: 100.0,
                is_on: true,
            },
            Device {
                name: "b",
                kind: DeviceKind::Other,
                power_w: 50.0,
                is_on: false,
            },
        ]
    }

    #[test]
    fn off_devices_do_not_count() {
        assert_eq!(total_active_power(&two_devices()), 100.0);
    }

    #[test]
    fn daily_energy_from_active_power() {
        assert!((daily_energy_kwh(&two_devices()) - 2.4).abs() < 1e-12);
    }

    #[test]
    fn monthly_cost_at_default_rate() {
        let c = monthly_cost(&two_devices(), DEFAULT_RATE);
        assert!((c - 8.64).abs() < 1e-9);
    }

    #[test]
    fn hvac_at_3000w_needs_service() {
        let d = Device {
            name: "hvac",
            kind: DeviceKind::Hvac,
            power_w: 3000.0,
            is_on: true,
        };
        let r = maintenance(&d);
        assert!((r.deviation - 0.25).abs() < 1e-12);
        assert!(r.needs_maintenance);
        assert!((r.confidence - 85.0).abs() < 1e-9);
        // 0.25 is not strictly over the service tier.
        assert_eq!(r.recommendation, Recommendation::Monitor);
    }

    #[test]
    fn extreme_deviation_caps_confidence() {
        let d = Device {
            name: "heater",
            kind: DeviceKind::Other,
            power_w: 500.0,
            is_on: true,
        };
        let r = maintenance(&d);
        assert_eq!(r.confidence, 95.0);
        assert_eq!(r.recommendation, Recommendation::ServiceSoon);
    }

    #[test]
    fn within_band_is_healthy() {
        let d = Device {
            name: "fridge",
            kind: DeviceKind::Appliance,
            power_w: 160.0,
            is_on: true,
        };
        let r = maintenance(&d);
        assert!(!r.needs_maintenance);
        assert_eq!(r.recommendation, Recommendation::Healthy);
    }
}
