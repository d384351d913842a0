// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Language aggregation across a user's repositories.
//!
//! Repository records and their language maps come from the fetcher; this
//! module sums the byte counts per language and selects the highest ranked
//! entries. Everything here is pure and synchronous.

use std::{collections::HashMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};

/// Repository record as returned by the listing endpoint.
///
/// Only the fields needed for aggregation are decoded; everything else in
/// the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize,)]
pub struct Repository
{
    /// Repository name.
    pub name:          String,
    /// Whether the repository is a fork of another one.
    #[serde(default)]
    pub fork:          bool,
    /// Endpoint reporting the repository's language byte counts.
    #[serde(default)]
    pub languages_url: Option<String,>,
}

impl Repository
{
    /// Returns `true` when the repository contributes to the tally under the
    /// given fork policy.
    pub fn is_considered(&self, include_forks: bool,) -> bool
    {
        (include_forks || !self.fork) && self.languages_url.is_some()
    }
}

/// Byte counts per language for one repository, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct LanguageBytes(Vec<(String, u64,),>,);

impl LanguageBytes
{
    /// Iterates over `(language, bytes)` pairs in document order.
    pub fn iter(&self,) -> impl Iterator<Item = (&str, u64,),> + '_
    {
        self.0.iter().map(|(name, bytes,)| (name.as_str(), *bytes,),)
    }

    /// Number of languages reported.
    pub fn len(&self,) -> usize
    {
        self.0.len()
    }

    /// Returns `true` when no language was reported.
    pub fn is_empty(&self,) -> bool
    {
        self.0.is_empty()
    }
}

impl<S: Into<String,>,> FromIterator<(S, u64,),> for LanguageBytes
{
    fn from_iter<I: IntoIterator<Item = (S, u64,),>,>(iter: I,) -> Self
    {
        Self(iter.into_iter().map(|(name, bytes,)| (name.into(), bytes,),).collect(),)
    }
}

impl<'de,> Deserialize<'de,> for LanguageBytes
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: Deserializer<'de,>,
    {
        struct LanguageBytesVisitor;

        impl<'de,> Visitor<'de,> for LanguageBytesVisitor
        {
            type Value = LanguageBytes;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_,>,) -> fmt::Result
            {
                formatter.write_str("a map of language names to byte counts",)
            }

            fn visit_map<A,>(self, mut access: A,) -> Result<Self::Value, A::Error,>
            where
                A: MapAccess<'de,>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0,),);
                while let Some((name, bytes,),) = access.next_entry::<String, u64>()? {
                    entries.push((name, bytes,),);
                }
                Ok(LanguageBytes(entries,),)
            }
        }

        deserializer.deserialize_map(LanguageBytesVisitor,)
    }
}

/// A repository paired with the language map fetched for it.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RepositoryLanguages
{
    /// Repository the map belongs to.
    pub repository: Repository,
    /// Bytes per language reported for the repository.
    pub languages:  LanguageBytes,
}

/// Cumulative byte counts per language.
///
/// Languages keep the position at which they were first encountered, which
/// is what breaks ties when ranking.
#[derive(Debug, Clone, Default,)]
pub struct LanguageTally
{
    entries: Vec<(String, u64,),>,
    index:   HashMap<String, usize,>,
}

impl LanguageTally
{
    /// Creates an empty tally.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Adds `bytes` to `language`, saturating at `u64::MAX`.
    pub fn add(&mut self, language: &str, bytes: u64,)
    {
        match self.index.get(language,) {
            Some(&position,) => {
                let total = &mut self.entries[position].1;
                *total = total.saturating_add(bytes,);
            }
            None => {
                self.index.insert(language.to_owned(), self.entries.len(),);
                self.entries.push((language.to_owned(), bytes,),);
            }
        }
    }

    /// Adds every entry of a repository's language map.
    pub fn add_all(&mut self, languages: &LanguageBytes,)
    {
        for (language, bytes,) in languages.iter() {
            self.add(language, bytes,);
        }
    }

    /// Total bytes recorded for `language`.
    pub fn get(&self, language: &str,) -> Option<u64,>
    {
        self.index.get(language,).map(|&position| self.entries[position].1,)
    }

    /// Number of distinct languages.
    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }

    /// Selects at most `limit` languages ordered by descending byte count.
    ///
    /// The sort is stable, so equal counts keep first-encountered order.
    ///
    /// # Examples
    ///
    /// ```
    /// use top_langs::LanguageTally;
    ///
    /// let mut tally = LanguageTally::new();
    /// tally.add("Rust", 300,);
    /// tally.add("Go", 200,);
    /// tally.add("C", 100,);
    ///
    /// let ranking = tally.top(2,);
    /// let names: Vec<_,> = ranking.iter().map(|share| share.name.as_str(),).collect();
    /// assert_eq!(names, ["Rust", "Go"]);
    /// ```
    pub fn top(&self, limit: usize,) -> Ranking
    {
        let mut shares: Vec<LanguageShare,> = self
            .entries
            .iter()
            .map(|(name, bytes,)| LanguageShare {
                name: name.clone(), bytes: *bytes,
            },)
            .collect();
        shares.sort_by(|left, right| right.bytes.cmp(&left.bytes,),);
        shares.truncate(limit,);
        Ranking(shares,)
    }
}

/// Sums the language maps of every repository considered under the fork
/// policy.
///
/// Forks are skipped unless `include_forks` is set, and repositories without
/// a language endpoint never contribute.
pub fn aggregate(entries: &[RepositoryLanguages], include_forks: bool,) -> LanguageTally
{
    let mut tally = LanguageTally::new();
    for entry in entries.iter().filter(|entry| entry.repository.is_considered(include_forks,),) {
        tally.add_all(&entry.languages,);
    }
    tally
}

/// A ranked language with its cumulative byte count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct LanguageShare
{
    /// Language name as reported by the API.
    pub name:  String,
    /// Bytes summed across considered repositories.
    pub bytes: u64,
}

/// Ordered top-N subset of a [`LanguageTally`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
#[serde(transparent)]
pub struct Ranking(Vec<LanguageShare,>,);

impl Ranking
{
    /// Wraps shares that are already ordered.
    pub fn from_shares(shares: Vec<LanguageShare,>,) -> Self
    {
        Self(shares,)
    }

    /// Ranked shares, highest first.
    pub fn shares(&self,) -> &[LanguageShare]
    {
        &self.0
    }

    /// Iterates over ranked shares, highest first.
    pub fn iter(&self,) -> std::slice::Iter<'_, LanguageShare,>
    {
        self.0.iter()
    }

    /// Number of ranked languages.
    pub fn len(&self,) -> usize
    {
        self.0.len()
    }

    /// Returns `true` when nothing was ranked.
    pub fn is_empty(&self,) -> bool
    {
        self.0.is_empty()
    }

    /// Sum of all ranked byte counts.
    pub fn total_bytes(&self,) -> u128
    {
        self.0.iter().map(|share| u128::from(share.bytes,),).sum()
    }

    /// Comma separated language names, for log output.
    pub fn names(&self,) -> String
    {
        self.0.iter().map(|share| share.name.as_str(),).collect::<Vec<_,>>().join(", ",)
    }
}

impl<'a,> IntoIterator for &'a Ranking
{
    type IntoIter = std::slice::Iter<'a, LanguageShare,>;
    type Item = &'a LanguageShare;

    fn into_iter(self,) -> Self::IntoIter
    {
        self.iter()
    }
}
