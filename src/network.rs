//! The fixed, undirected contact network.
//!
//! Neighbor lists keep insertion order. The susceptible update walks them in
//! that order, so the order edges are added (or read from a file) is part of a
//! run's reproducibility.
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::ModelError;
use crate::people::{ContextPeopleExt, PersonId};

struct NetworkData {
    neighbors: Vec<Vec<PersonId>>,
    edge_count: usize,
}

impl NetworkData {
    fn new() -> Self {
        NetworkData {
            neighbors: Vec::new(),
            edge_count: 0,
        }
    }

    fn neighbors_of(&self, person: PersonId) -> &[PersonId] {
        self.neighbors
            .get(person.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn add_edge(&mut self, person: PersonId, neighbor: PersonId) -> Result<(), ModelError> {
        if person == neighbor {
            return Err(ModelError::ModelError(format!(
                "cannot make edge from {person} to self"
            )));
        }
        if self.neighbors_of(person).contains(&neighbor) {
            return Err(ModelError::ModelError(format!(
                "edge between {person} and {neighbor} already exists"
            )));
        }

        let index = person.index();
        if index >= self.neighbors.len() {
            self.neighbors.resize_with(index + 1, Vec::new);
        }
        self.neighbors[index].push(neighbor);
        Ok(())
    }
}

define_data_plugin!(NetworkPlugin, NetworkData, NetworkData::new());

#[derive(Deserialize, Debug)]
struct EdgeRecord {
    v1: usize,
    v2: usize,
}

pub trait ContextNetworkExt {
    /// Connects two existing people in both directions.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` for self-loops, duplicate edges, or people who
    /// have not been added. The network is unchanged on error.
    fn add_edge_bidi(&mut self, person1: PersonId, person2: PersonId) -> Result<(), ModelError>;

    /// Neighbors of `person` in insertion order. Empty for unconnected people.
    fn get_neighbors(&self, person: PersonId) -> &[PersonId];

    fn get_degree(&self, person: PersonId) -> usize;

    /// Number of undirected edges.
    fn get_edge_count(&self) -> usize;

    /// Reads a CSV edge list with `v1,v2` columns holding person indices and
    /// adds each row as an undirected edge, in file order.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if the file cannot be read or parsed, or if any row
    /// would be rejected by `add_edge_bidi`.
    fn load_edge_list(&mut self, path: &Path) -> Result<usize, ModelError>;
}

impl ContextNetworkExt for Context {
    fn add_edge_bidi(&mut self, person1: PersonId, person2: PersonId) -> Result<(), ModelError> {
        let population = self.get_current_population();
        for person in [person1, person2] {
            if person.index() >= population {
                return Err(ModelError::ModelError(format!(
                    "cannot add edge for unknown {person}; population is {population}"
                )));
            }
        }
        let data_container = self.get_data_container_mut(NetworkPlugin);
        // Symmetric storage means checking one direction covers both.
        data_container.add_edge(person1, person2)?;
        data_container.add_edge(person2, person1)?;
        data_container.edge_count += 1;
        Ok(())
    }

    fn get_neighbors(&self, person: PersonId) -> &[PersonId] {
        self.get_data_container(NetworkPlugin)
            .map(|data_container| data_container.neighbors_of(person))
            .unwrap_or_default()
    }

    fn get_degree(&self, person: PersonId) -> usize {
        self.get_neighbors(person).len()
    }

    fn get_edge_count(&self) -> usize {
        self.get_data_container(NetworkPlugin)
            .map_or(0, |data_container| data_container.edge_count)
    }

    fn load_edge_list(&mut self, path: &Path) -> Result<usize, ModelError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut loaded = 0;
        for result in reader.deserialize() {
            let record: EdgeRecord = result?;
            let person1 = self.get_person_id(record.v1)?;
            let person2 = self.get_person_id(record.v2)?;
            self.add_edge_bidi(person1, person2)?;
            loaded += 1;
        }
        info!("loaded {loaded} edges from {}", path.display());
        Ok(loaded)
    }
}
