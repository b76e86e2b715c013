#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<servolink_config::Config>(data) {
        if cfg.validate().is_ok() {
            let pairs = cfg.resolved_pairs();
            assert!(pairs.len() <= cfg.capacity());
        }
    }
});
