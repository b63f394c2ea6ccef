use std::collections::HashMap;

use crate::types::Workflow;
use crate::validate::rules::step;
use crate::validate::validator::Validator;

pub(crate) fn validate_workflow(v: &mut Validator, wf: &Workflow, path: &str) {
    if wf.name.trim().is_empty() {
        v.push(format!("{path}.name"), "must not be empty");
    }

    if wf.steps.is_empty() {
        v.push(format!("{path}.steps"), "must have at least one entry");
    }

    let mut orders = HashMap::<i64, usize>::new();
    for (idx, s) in wf.steps.iter().enumerate() {
        let spath = format!("{path}.steps[{idx}]");
        if let Some(first) = orders.insert(s.order, idx) {
            v.push(
                format!("{spath}.order"),
                format!("duplicate order {} (also used by steps[{first}])", s.order),
            );
        }
        step::validate_step(v, s, &spath);
    }
}
