use std::{
    fmt,
    hash::{BuildHasher, Hash},
    ops::Deref,
};

use log::trace;

use crate::{
    error::{MultiDictError, Result},
    header::AxisHeader,
    key::{AxisKey, Key},
};

/// The internal address of a stored value: one header position per axis.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Coordinate(Box<[usize]>);

impl Coordinate {
    /// Creates a coordinate from a list of positions
    pub fn new(positions: Vec<usize>) -> Self {
        Self(positions.into_boxed_slice())
    }

    /// Returns the number of axes the coordinate spans
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Coordinate {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Coordinate {
    fn from(positions: Vec<usize>) -> Self {
        Self::new(positions)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("");
        for pos in self.0.iter() {
            tuple.field(pos);
        }
        tuple.finish()
    }
}

/// The candidate positions of one axis of a partial key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Selection {
    One(usize),
    Many(Vec<usize>),
}

impl Selection {
    pub(crate) fn positions(&self) -> &[usize] {
        match self {
            Selection::One(pos) => std::slice::from_ref(pos),
            Selection::Many(positions) => positions,
        }
    }
}

/// A translated key: either a single cell or a set of candidates per axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolved {
    Point(Coordinate),
    Partial(Vec<Selection>),
}

/// Turns one axis token into the positions it selects. Reads never insert.
pub(crate) fn resolve_token<L, S>(
    header: &AxisHeader<L, S>,
    axis: usize,
    token: &AxisKey<L>,
) -> Result<Selection, L>
where
    L: Eq + Hash + Clone,
    S: BuildHasher,
{
    match token {
        AxisKey::Label(l) => header.index_of(axis, l).map(Selection::One),
        AxisKey::Many(ls) => header.resolve_many(axis, ls).map(Selection::Many),
        AxisKey::Range { start, stop, step } => header
            .resolve_range(axis, start.as_ref(), stop.as_ref(), *step)
            .map(Selection::Many),
    }
}

/// Translates a key against the headers of a map. Keys shorter than the number of headers are
/// padded with full-axis wildcards.
pub(crate) fn resolve<L, S>(headers: &[AxisHeader<L, S>], key: &Key<L>) -> Result<Resolved, L>
where
    L: Eq + Hash + Clone,
    S: BuildHasher,
{
    if key.len() > headers.len() {
        return Err(MultiDictError::ArityMismatch {
            expected: headers.len(),
            found: key.len(),
        });
    }
    let full = AxisKey::all();
    let mut selections = Vec::with_capacity(headers.len());
    for (axis, header) in headers.iter().enumerate() {
        let token = key.tokens().get(axis).unwrap_or(&full);
        selections.push(resolve_token(header, axis, token)?);
    }
    let concrete = selections
        .iter()
        .all(|sel| matches!(sel, Selection::One(_)));
    if concrete {
        let positions = selections
            .into_iter()
            .filter_map(|sel| match sel {
                Selection::One(pos) => Some(pos),
                Selection::Many(_) => None,
            })
            .collect();
        Ok(Resolved::Point(Coordinate::new(positions)))
    } else {
        trace!("key resolved to a partial selection");
        Ok(Resolved::Partial(selections))
    }
}

/// Translates a concrete key for a write, appending missing labels. The key is fully validated
/// before any header is touched.
pub(crate) fn resolve_for_write<L, S>(
    headers: &mut [AxisHeader<L, S>],
    key: Key<L>,
) -> Result<Coordinate, L>
where
    L: Eq + Hash,
    S: BuildHasher,
{
    if key.len() != headers.len() {
        return Err(MultiDictError::ArityMismatch {
            expected: headers.len(),
            found: key.len(),
        });
    }
    if let Some(axis) = key.tokens().iter().position(|t| !t.is_concrete()) {
        return Err(MultiDictError::PartialKey { axis });
    }
    let positions = key
        .into_iter()
        .zip(headers.iter_mut())
        .filter_map(|(token, header)| match token {
            AxisKey::Label(l) => Some(header.insert(l)),
            _ => None,
        })
        .collect();
    Ok(Coordinate::new(positions))
}

/// Translates a coordinate back into the external labels of its axes.
pub(crate) fn labels_of<'a, L, S>(
    headers: &'a [AxisHeader<L, S>],
    coordinate: &Coordinate,
) -> Vec<&'a L> {
    coordinate
        .iter()
        .zip(headers.iter())
        .filter_map(|(pos, header)| header.label(*pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key, label::Label};

    fn headers() -> Vec<AxisHeader> {
        vec![
            [1, 2, 3].into_iter().map(Label::from).collect(),
            ["A", "B"].into_iter().map(Label::from).collect(),
        ]
    }

    #[test]
    fn point_resolution_test() {
        let headers = headers();
        assert_eq!(
            resolve(&headers, &key![2, "B"]),
            Ok(Resolved::Point(Coordinate::new(vec![1, 1])))
        );
    }

    #[test]
    fn partial_resolution_test() {
        let headers = headers();
        assert_eq!(
            resolve(&headers, &key![.., "B"]),
            Ok(Resolved::Partial(vec![
                Selection::Many(vec![0, 1, 2]),
                Selection::One(1)
            ]))
        );
        assert_eq!(
            resolve(&headers, &key![[3, 1]]),
            Ok(Resolved::Partial(vec![
                Selection::Many(vec![2, 0]),
                Selection::Many(vec![0, 1])
            ]))
        );
    }

    #[test]
    fn resolution_errors_test() {
        let headers = headers();
        assert_eq!(
            resolve(&headers, &key![1, "B", "C"]),
            Err(MultiDictError::ArityMismatch {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            resolve(&headers, &key![4, "B"]),
            Err(MultiDictError::LabelNotFound {
                axis: 0,
                label: Label::from(4)
            })
        );
    }

    #[test]
    fn write_resolution_test() {
        let mut headers = headers();
        assert_eq!(
            resolve_for_write(&mut headers, key![4, "B"]),
            Ok(Coordinate::new(vec![3, 1]))
        );
        assert_eq!(headers[0].len(), 4);
        // A rejected write leaves the headers alone
        assert_eq!(
            resolve_for_write(&mut headers, key![5, ..]),
            Err(MultiDictError::PartialKey { axis: 1 })
        );
        assert_eq!(headers[0].len(), 4);
        assert_eq!(
            labels_of(&headers, &Coordinate::new(vec![3, 1])),
            vec![&Label::from(4), &Label::from("B")]
        );
    }
}
