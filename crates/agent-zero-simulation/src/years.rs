//! Parsing of `--years` arguments
//!
//! Accepts `start:end`, `start:step:end` (both inclusive of `end` when the
//! step lands on it), a comma separated list, or a single year.

use crate::error::{SimulationError, SimulationResult};

pub fn parse_years(arg: &str) -> SimulationResult<Vec<i32>> {
    let arg = arg.trim();

    if arg.contains(',') {
        let mut years = arg
            .split(',')
            .map(|part| part.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SimulationError::Years(format!("Invalid year list format: {arg}")))?;
        years.sort_unstable();
        return Ok(years);
    }

    if arg.contains(':') {
        let parts = arg
            .split(':')
            .map(|part| part.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SimulationError::Years(format!("Invalid year range format: {arg}")))?;
        let (start, step, end) = match parts.as_slice() {
            [start, end] => (*start, 1, *end),
            [start, step, end] => (*start, *step, *end),
            _ => {
                return Err(SimulationError::Years(format!(
                    "Invalid year range format: {arg}"
                )))
            }
        };
        if step <= 0 {
            return Err(SimulationError::Years(format!(
                "Step must be positive, got {step}"
            )));
        }
        if start > end {
            return Err(SimulationError::Years(format!(
                "Start year {start} must be <= end year {end}"
            )));
        }
        // step > 0 checked above
        return Ok((start..=end).step_by(step as usize).collect());
    }

    arg.parse::<i32>()
        .map(|year| vec![year])
        .map_err(|_| SimulationError::Years(format!("Invalid year specification: {arg}")))
}
