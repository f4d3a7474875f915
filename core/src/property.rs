// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Named properties and named property lists.

use crate::Result;
use std::collections::HashMap;

/// A single `(name, value)` entry of a property list.
pub type Property = (String, String);

/// PropertySource is the read side of a property container.
///
/// Signing algorithms only read through this trait, and both lookups are
/// total: an unset name is a valid answer (`None` / empty slice), never an error.
pub trait PropertySource {
    /// Get the value of a property.
    fn get_property(&self, name: &str) -> Option<&str>;

    /// Get a property list in insertion order.
    fn get_property_list(&self, name: &str) -> &[Property];
}

/// PropertyStore owns named properties and named, ordered property lists.
///
/// Every string handed to the store is copied in. Copies are reserved with
/// `try_reserve` first, so a failed allocation surfaces as
/// [`crate::ErrorKind::ResourceExhausted`] and leaves the store as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    properties: HashMap<String, String>,
    property_lists: HashMap<String, Vec<Property>>,
}

impl PropertyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a property.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        let name = try_copy(name)?;
        let value = try_copy(value)?;
        self.properties.try_reserve(1)?;

        self.properties.insert(name, value);
        Ok(())
    }

    /// Get a property, `None` if it was never set.
    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Append one entry to a list, creating the list on first use.
    pub fn append_to_list(&mut self, list_name: &str, name: &str, value: &str) -> Result<()> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(1)?;
        entries.push((try_copy(name)?, try_copy(value)?));

        self.merge_list(list_name, entries, false)
    }

    /// Replace a list with `pairs`, creating it if absent.
    ///
    /// Calling this twice keeps only the second batch. Use [`Self::extend_list`]
    /// to accumulate instead.
    pub fn set_list<'a>(
        &mut self,
        list_name: &str,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        let entries = copy_pairs(pairs)?;
        self.merge_list(list_name, entries, true)
    }

    /// Append all `pairs` to the end of a list, creating it if absent.
    pub fn extend_list<'a>(
        &mut self,
        list_name: &str,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        let entries = copy_pairs(pairs)?;
        self.merge_list(list_name, entries, false)
    }

    /// Get a list in insertion order, empty if it was never set.
    pub fn get_list(&self, list_name: &str) -> &[Property] {
        self.property_lists
            .get(list_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over all properties in arbitrary order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if neither properties nor lists have been set.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.property_lists.is_empty()
    }

    /// Store already copied entries into a list.
    ///
    /// All fallible reservations happen before the store is touched.
    fn merge_list(&mut self, list_name: &str, entries: Vec<Property>, replace: bool) -> Result<()> {
        match self.property_lists.get_mut(list_name) {
            Some(list) if replace => *list = entries,
            Some(list) => {
                list.try_reserve(entries.len())?;
                list.extend(entries);
            }
            None => {
                let key = try_copy(list_name)?;
                self.property_lists.try_reserve(1)?;
                self.property_lists.insert(key, entries);
            }
        }
        Ok(())
    }
}

impl PropertySource for PropertyStore {
    fn get_property(&self, name: &str) -> Option<&str> {
        PropertyStore::get_property(self, name)
    }

    fn get_property_list(&self, name: &str) -> &[Property] {
        self.get_list(name)
    }
}

fn try_copy(s: &str) -> Result<String> {
    let mut v = String::new();
    v.try_reserve_exact(s.len())?;
    v.push_str(s);
    Ok(v)
}

fn copy_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Vec<Property>> {
    let pairs = pairs.into_iter();
    let mut entries = Vec::new();
    entries.try_reserve(pairs.size_hint().0)?;

    for (name, value) in pairs {
        entries.try_reserve(1)?;
        entries.push((try_copy(name)?, try_copy(value)?));
    }
    Ok(entries)
}
