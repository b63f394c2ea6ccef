use crate::types::{Assertion, Step};
use crate::validate::validator::{Validator, VARIABLE_NAME_RE};

pub(crate) fn validate_step(v: &mut Validator, step: &Step, path: &str) {
    if step.name.trim().is_empty() {
        v.push(format!("{path}.name"), "must not be empty");
    }

    // Source steps are checked when the mapping is resolved, not here.
    for (idx, m) in step.variable_mappings.iter().enumerate() {
        let mpath = format!("{path}.variableMappings[{idx}]");
        if !VARIABLE_NAME_RE.is_match(&m.target_variable) {
            v.push(
                format!("{mpath}.targetVariable"),
                "must match regex ^[A-Za-z_][A-Za-z0-9_.\\-]*$",
            );
        }
        if m.source_path.trim().is_empty() {
            v.push(format!("{mpath}.sourcePath"), "must not be empty");
        }
    }

    for (idx, a) in step.assertions.iter().enumerate() {
        let apath = format!("{path}.assertions[{idx}]");
        match a {
            Assertion::StatusCode { expected } if !(100..=599).contains(expected) => {
                v.push(format!("{apath}.expected"), "must be a status code between 100 and 599");
            }
            Assertion::Header { name, .. } if name.trim().is_empty() => {
                v.push(format!("{apath}.name"), "must not be empty");
            }
            Assertion::JsonPath { path: p, .. } if p.trim().is_empty() => {
                v.push(format!("{apath}.path"), "must not be empty");
            }
            _ => {}
        }
    }
}
