// Copyright (C) Parity Technologies (UK) Ltd.
// This file is part of Polkadot.

// Polkadot is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Polkadot is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Polkadot.  If not, see <http://www.gnu.org/licenses/>.

//! Logger initialization.

use tracing_subscriber::{
	fmt::{time::OffsetTime, SubscriberBuilder},
	EnvFilter,
};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "warn,xcm-client=info,xcm-tracker=info,xcm-tools=info";

/// Initialize the logger. Records go to stderr, leaving stdout to command output.
pub fn initialize_logger(with_timestamp: bool) {
	let format = time::format_description::parse(
		"[year]-[month]-[day] \
		[hour repr:24]:[minute]:[second] [offset_hour sign:mandatory]",
	)
	.expect("static format string is valid");

	let local_time = OffsetTime::new(
		time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC),
		format,
	);

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

	let builder = SubscriberBuilder::default()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr);

	if with_timestamp {
		builder.with_timer(local_time).init();
	} else {
		builder.without_time().init();
	}
}
