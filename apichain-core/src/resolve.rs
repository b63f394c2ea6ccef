//! `{{name}}` substitution over every string reachable in a request.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::expressions::parse_template;
use crate::types::{ApiRequest, GraphQlRequest, GrpcRequest, RestRequest};
use crate::variables::VariableBag;

#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub request: ApiRequest,
    /// Tokens left literal in optional fields.
    pub unresolved: Vec<UnresolvedToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedToken {
    pub field: String,
    pub name: String,
}

impl std::fmt::Display for UnresolvedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unresolved variable `{}` left in {}", self.name, self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstitutionError {
    #[error("unresolved variable `{name}` in required field {field}")]
    Unresolved { field: String, name: String },
}

/// Replaces `{{name}}` tokens with the bag's stringified values.
///
/// Unknown names stay literal and are reported, except in fields a request cannot be sent
/// without (endpoint, REST method, gRPC service and method), where they are an error.
pub fn substitute(request: &ApiRequest, bag: &VariableBag) -> Result<Substitution, SubstitutionError> {
    let mut s = Substituter {
        bag,
        unresolved: Vec::new(),
    };

    let request = match request {
        ApiRequest::Rest(r) => ApiRequest::Rest(RestRequest {
            method: s.required("method", &r.method)?,
            endpoint: s.required("endpoint", &r.endpoint)?,
            headers: s.map("headers", &r.headers),
            body: r.body.as_ref().map(|b| s.value("body", b)),
            query_params: s.map("queryParams", &r.query_params),
        }),
        ApiRequest::GraphQl(g) => ApiRequest::GraphQl(GraphQlRequest {
            endpoint: s.required("endpoint", &g.endpoint)?,
            query: s.string("query", &g.query),
            variables: g.variables.as_ref().map(|vars| {
                vars.iter()
                    .map(|(k, v)| (k.clone(), s.value(&format!("variables.{k}"), v)))
                    .collect()
            }),
            operation_name: g.operation_name.clone(),
            headers: s.map("headers", &g.headers),
        }),
        ApiRequest::Grpc(g) => ApiRequest::Grpc(GrpcRequest {
            endpoint: s.required("endpoint", &g.endpoint)?,
            service: s.required("service", &g.service)?,
            method: s.required("method", &g.method)?,
            message: g
                .message
                .iter()
                .map(|(k, v)| (k.clone(), s.value(&format!("message.{k}"), v)))
                .collect(),
            metadata: s.map("metadata", &g.metadata),
            tls: g.tls,
        }),
        ApiRequest::Unsupported(u) => ApiRequest::Unsupported(u.clone()),
    };

    Ok(Substitution {
        request,
        unresolved: s.unresolved,
    })
}

struct Substituter<'a> {
    bag: &'a VariableBag,
    unresolved: Vec<UnresolvedToken>,
}

impl Substituter<'_> {
    fn render(&self, input: &str) -> (String, Vec<String>) {
        let template = parse_template(input);
        if !template.has_placeholders() {
            return (input.to_string(), Vec::new());
        }
        template.render(|name| self.bag.get_str(name))
    }

    fn string(&mut self, field: &str, input: &str) -> String {
        let (out, missing) = self.render(input);
        for name in missing {
            self.unresolved.push(UnresolvedToken {
                field: field.to_string(),
                name,
            });
        }
        out
    }

    fn required(&mut self, field: &str, input: &str) -> Result<String, SubstitutionError> {
        let (out, missing) = self.render(input);
        match missing.into_iter().next() {
            Some(name) => Err(SubstitutionError::Unresolved {
                field: field.to_string(),
                name,
            }),
            None => Ok(out),
        }
    }

    fn map(&mut self, field: &str, input: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        input
            .iter()
            .map(|(k, v)| (k.clone(), self.string(&format!("{field}.{k}"), v)))
            .collect()
    }

    fn value(&mut self, field: &str, input: &JsonValue) -> JsonValue {
        match input {
            JsonValue::String(s) => JsonValue::String(self.string(field, s)),
            JsonValue::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| self.value(&format!("{field}[{i}]"), v))
                    .collect(),
            ),
            JsonValue::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.value(&format!("{field}.{k}"), v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
