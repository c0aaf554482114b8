//! Contract tests for the nsgql command-line surface

mod output_contracts;
