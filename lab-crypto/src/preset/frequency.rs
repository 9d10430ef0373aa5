use lazy_static::lazy_static;
use std::collections::BTreeMap;

/// Expected relative frequency of each lowercase letter of a language.
///
/// Frequencies are normalised so they sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    expected: BTreeMap<char, f64>,
}

impl FrequencyTable {
    /// Builds a table from `(symbol, percentage)` pairs, normalising the weights.
    pub fn from_percentages(pairs: &[(char, f64)]) -> Self {
        let total: f64 = pairs.iter().map(|&(_, p)| p).sum();
        let expected = pairs
            .iter()
            .filter(|&&(_, p)| p > 0.0)
            .map(|&(c, p)| (c, p / total))
            .collect();
        Self { expected }
    }

    pub fn expected(&self, symbol: char) -> Option<f64> {
        self.expected.get(&symbol).copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.expected.contains_key(&symbol)
    }

    /// Symbols and their expected relative frequency, ordered by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.expected.iter().map(|(&c, &p)| (c, p))
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }
}

lazy_static! {
    pub static ref ENGLISH_FREQUENCIES: FrequencyTable = FrequencyTable::from_percentages(&[
        ('a', 8.167), ('b', 1.492), ('c', 2.782), ('d', 4.253), ('e', 12.702),
        ('f', 2.228), ('g', 2.015), ('h', 6.094), ('i', 6.966), ('j', 0.153),
        ('k', 0.772), ('l', 4.025), ('m', 2.406), ('n', 6.749), ('o', 7.507),
        ('p', 1.929), ('q', 0.095), ('r', 5.987), ('s', 6.327), ('t', 9.056),
        ('u', 2.758), ('v', 0.978), ('w', 2.360), ('x', 0.150), ('y', 1.974),
        ('z', 0.074),
    ]);

    pub static ref UKRAINIAN_FREQUENCIES: FrequencyTable = FrequencyTable::from_percentages(&[
        ('а', 7.20), ('б', 1.60), ('в', 5.30), ('г', 1.50), ('ґ', 0.01),
        ('д', 3.30), ('е', 4.70), ('є', 0.60), ('ж', 0.90), ('з', 2.10),
        ('и', 6.10), ('і', 5.90), ('ї', 0.60), ('й', 1.20), ('к', 4.00),
        ('л', 3.80), ('м', 3.10), ('н', 6.50), ('о', 9.40), ('п', 2.90),
        ('р', 4.70), ('с', 4.10), ('т', 5.50), ('у', 3.70), ('ф', 0.30),
        ('х', 1.20), ('ц', 0.90), ('ч', 1.30), ('ш', 0.80), ('щ', 0.50),
        ('ь', 1.60), ('ю', 0.80), ('я', 2.20),
    ]);
}
