// This module is only compiled during tests

pub mod mock_sensors;
