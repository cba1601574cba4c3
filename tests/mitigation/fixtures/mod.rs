// tests/mitigation/fixtures/mod.rs
