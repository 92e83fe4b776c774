use super::person::Person;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Everyone known to the kiosk, keyed by lowercase full name.
#[derive(Debug, Default, Clone)]
pub struct PeopleRegistry {
    people: HashMap<String, Person>,
}

impl PeopleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored records; records naming the same person merge.
    pub fn from_people(people: impl IntoIterator<Item = Person>) -> Self {
        let mut registry = Self::new();
        for person in people {
            match registry.people.get_mut(&person.key()) {
                Some(existing) => existing.merge(person),
                None => {
                    registry.people.insert(person.key(), person);
                }
            }
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn get(&self, full_name: &str) -> Option<&Person> {
        self.people.get(&Person::key_for(full_name))
    }

    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut Person> {
        self.people.get_mut(&Person::key_for(full_name))
    }

    /// Return the registered person with the candidate's name, inserting the
    /// candidate first if nobody by that name exists yet.
    pub fn resolve_or_insert(&mut self, candidate: Person) -> &mut Person {
        self.people.entry(candidate.key()).or_insert(candidate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Person> {
        self.people.values_mut()
    }

    pub fn signed_in(&self, now: NaiveDateTime) -> impl Iterator<Item = &Person> {
        self.people.values().filter(move |p| p.is_signed_in_at(now))
    }

    /// People sorted by role, then full name: the order used on disk and in
    /// listings.
    pub fn sorted(&self) -> Vec<&Person> {
        let mut list: Vec<&Person> = self.people.values().collect();
        list.sort_by(|a, b| {
            a.role()
                .cmp(&b.role())
                .then_with(|| a.full_name().cmp(&b.full_name()))
        });
        list
    }
}
