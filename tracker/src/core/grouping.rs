//! Grouping engine: partitions records by material type
//!
//! Groups keep the order in which their material type was first encountered.

use serde::Serialize;
use shared::{MaterialGroup, MaterialType, Record};

/// Ordered material groups with lookup by type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedRecords {
    groups: Vec<MaterialGroup>,
}

impl GroupedRecords {
    pub fn get(&self, material_type: &MaterialType) -> Option<&MaterialGroup> {
        self.groups.iter().find(|group| &group.material_type == material_type)
    }

    pub fn groups(&self) -> &[MaterialGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<MaterialGroup> {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn material_types(&self) -> impl Iterator<Item = &MaterialType> {
        self.groups.iter().map(|group| &group.material_type)
    }

    fn add(&mut self, record: &Record) {
        match self
            .groups
            .iter_mut()
            .find(|group| group.material_type == record.material_type)
        {
            Some(group) => group.add(record),
            None => {
                let mut group = MaterialGroup::new(record.material_type.clone());
                group.add(record);
                self.groups.push(group);
            }
        }
    }
}

/// Fold every given record into per-type groups, regardless of state
pub fn group_by_type<'a, I>(records: I) -> GroupedRecords
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut grouped = GroupedRecords::default();
    for record in records {
        grouped.add(record);
    }
    grouped
}

/// Groups of the records that are still waiting for dispatch
pub fn group_active_by_type<'a, I>(records: I) -> GroupedRecords
where
    I: IntoIterator<Item = &'a Record>,
{
    group_by_type(records.into_iter().filter(|record| record.is_active()))
}
