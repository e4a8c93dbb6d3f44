//! GPU device peak specifications.
//!
//! Peak FP16 throughput and memory bandwidth for the datacenter GPUs the
//! roofline estimator understands. Sources: vendor datasheets (NVIDIA
//! A100/H100/V100/T4/L4), dense (non-sparsity) FP16 tensor numbers.

/// Peak specification for one GPU device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSpec {
    /// Canonical device name as it appears in workload specs ("A100").
    pub name: &'static str,
    /// Peak FP16 compute throughput in TFLOPS.
    pub peak_tflops: f64,
    /// Peak memory bandwidth in GB/s.
    pub mem_bw_gb_s: f64,
    /// On-board memory in GB.
    pub mem_gb: u32,
}

impl DeviceSpec {
    /// Peak compute throughput in FLOP/s.
    pub fn peak_flops(&self) -> f64 {
        self.peak_tflops * 1e12
    }

    /// Memory bandwidth in bytes/s.
    pub fn mem_bw_bytes(&self) -> f64 {
        self.mem_bw_gb_s * 1e9
    }

    /// Roofline ridge point in FLOP/byte: arithmetic intensity above which
    /// the device is compute-bound.
    pub fn ridge_point(&self) -> f64 {
        self.peak_flops() / self.mem_bw_bytes()
    }
}

/// All devices known to the roofline estimator.
pub static ALL_DEVICES: &[DeviceSpec] = &[
    DeviceSpec { name: "A100", peak_tflops: 312.0, mem_bw_gb_s: 2039.0, mem_gb: 80 },
    DeviceSpec { name: "H100", peak_tflops: 989.0, mem_bw_gb_s: 3350.0, mem_gb: 80 },
    DeviceSpec { name: "V100", peak_tflops: 125.0, mem_bw_gb_s: 900.0, mem_gb: 32 },
    DeviceSpec { name: "T4", peak_tflops: 65.0, mem_bw_gb_s: 300.0, mem_gb: 16 },
    DeviceSpec { name: "L4", peak_tflops: 121.0, mem_bw_gb_s: 300.0, mem_gb: 24 },
];

/// Look up a device by canonical name. Unknown names return `None`.
pub fn device_spec(name: &str) -> Option<&'static DeviceSpec> {
    ALL_DEVICES.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_devices_resolve() {
        for name in ["A100", "H100", "V100", "T4", "L4"] {
            assert!(device_spec(name).is_some(), "{name} should be in catalog");
        }
    }

    #[test]
    fn test_unknown_device_is_none() {
        assert!(device_spec("TPUv4").is_none());
        assert!(device_spec("a100").is_none(), "lookup is case-sensitive");
    }

    #[test]
    fn test_ridge_point_ordering() {
        // H100 has a higher compute:bandwidth ratio than V100.
        let h100 = device_spec("H100").unwrap();
        let v100 = device_spec("V100").unwrap();
        assert!(h100.ridge_point() > v100.ridge_point());
    }
}
