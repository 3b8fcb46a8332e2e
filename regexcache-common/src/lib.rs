//  Copyright 2026 The Regexcache Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Common components shared by every crate in the regexcache workspace:
//! the error taxonomy, the metrics sink contract, and the injectable
//! clock used for deterministic time in tests.

pub mod clock;
pub mod error;
pub mod metrics;

pub use clock::{Clock, MonotonicClock, TestClock};
pub use error::{Error, Result};
