//! Endpoint addressing for fetch units

use crate::core::query::QueryDescriptor;
use std::fmt;

/// Prefix of the dynamic entity routes
pub const ENTITY_ROUTE_PREFIX: &str = "/api/entities";

/// Path plus query pairs of one list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    query: Vec<(String, String)>,
}

impl Endpoint {
    /// An arbitrary path, e.g. `/api/reports/attendance`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// The list route of an entity
    pub fn entity(name: &str) -> Self {
        Self::new(format!("{}/{}", ENTITY_ROUTE_PREFIX, name))
    }

    /// Append the query pairs of a descriptor
    pub fn with_descriptor(mut self, descriptor: &QueryDescriptor) -> Self {
        self.query.extend(descriptor.to_query_pairs());
        self
    }

    /// Append one parameter (e.g. a filter alias such as `categoryId`)
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (name, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::SortDirection;

    #[test]
    fn test_entity_endpoint_with_descriptor() {
        let descriptor = QueryDescriptor::new()
            .sort_by("sort_order", SortDirection::Ascending)
            .paginate(2, 10);
        let endpoint = Endpoint::entity("committees")
            .with_descriptor(&descriptor)
            .with_param("seasonId", "2024");

        assert_eq!(endpoint.path(), "/api/entities/committees");
        assert_eq!(
            endpoint.to_string(),
            "/api/entities/committees?page=2&limit=10&sort=sort_order:asc&seasonId=2024"
        );
    }
}
