//! Track-hash rewrite.
//!
//! A track lists its sections as `LIST (hash, section1, section2, ...)`,
//! where `hash` names the hash-index definition. Each section lowers to a
//! list flavor with 7 level-of-detail offsets followed by the offset of a
//! data flavor. The rewrite pops those pairs and stores them again in this
//! layout:
//!
//! ```text
//! padded = last ex pairs + all N pairs + first ex pairs    (ex = N / 2)
//! root   = F11 [len(padded)] padded list offsets
//! hash   = F11 [1 + K] [root, main[i0], ..., main[iK-1]]
//! ```
//!
//! `main` is the padded sequence without its head padding, and `i0..iK-1`
//! are the numbers of the hash definition. The wrap-around padding lets
//! lookups run past either end of a closed circuit.

use log::{debug, info};

use threedo_core::flavor::{Flavor, FlavorType, Offset};
use threedo_parser::ast::Node;

use super::{Context, ConvertError, Converter, Result, TrackHashError};

/// Level-of-detail offsets in a section list, before its data offset.
const LOD_FIELDS: usize = 7;

impl<'d> Converter<'d> {
    pub(super) fn lower_track_hash(
        &mut self,
        items: &'d [Node],
        hash: &str,
        context: Context,
    ) -> Result<Offset> {
        let Some((first, sections)) = items.split_first() else {
            return Err(TrackHashError::HashNotFirst(hash.to_string()).into());
        };
        if first.as_word() != Some(hash) {
            return Err(TrackHashError::HashNotFirst(hash.to_string()).into());
        }

        let offsets = self.lower_all(sections, context)?;
        info!(hash, sections = offsets.len(); "Rewriting track hash");

        let pairs = self.pop_sections(&offsets)?;
        let ex = pairs.len() / 2;
        let padded = pairs[pairs.len() - ex..]
            .iter()
            .chain(&pairs)
            .chain(&pairs[..ex]);

        let mut lists = Vec::with_capacity(pairs.len() + 2 * ex);
        for (list, data) in padded {
            let list_offset = self.store(
                FlavorType::List,
                vec![LOD_FIELDS as i64],
                list.values2().to_vec(),
            );
            let data_offset = self.store(FlavorType::Data, data.values1().to_vec(), Vec::new());
            if let Some(record) = self.flavors.get_mut(data_offset) {
                record.add_parent(list_offset);
            }
            lists.push(list_offset);
        }

        let root = self.store(
            FlavorType::List,
            vec![lists.len() as i64],
            lists.iter().map(|offset| i64::from(*offset)).collect(),
        );
        debug!(root, padded = lists.len(), ex; "Stored padded sections");

        let main = &lists[ex..ex + pairs.len()];
        let mut hashed = vec![i64::from(root)];
        for index in self.hash_indices(hash, main.len())? {
            hashed.push(i64::from(main[index]));
        }

        Ok(self.store(FlavorType::List, vec![hashed.len() as i64], hashed))
    }

    /// Pop every section list and its trailing data flavor.
    fn pop_sections(&mut self, offsets: &[Offset]) -> Result<Vec<(Flavor, Flavor)>> {
        let mut lists = Vec::with_capacity(offsets.len());
        for &offset in offsets {
            let list = self.pop_flavor(i64::from(offset), FlavorType::List)?;
            if list.values2().len() != LOD_FIELDS + 1 {
                return Err(TrackHashError::PayloadLength {
                    offset,
                    expected: LOD_FIELDS + 1,
                    found: list.values2().len(),
                }
                .into());
            }
            lists.push(list);
        }

        let mut pairs = Vec::with_capacity(lists.len());
        for mut list in lists {
            let data_offset = list
                .pop_value2()
                .ok_or(TrackHashError::MissingFlavor(i64::from(list.offset())))?;
            let data = self.pop_flavor(data_offset, FlavorType::Data)?;
            pairs.push((list, data));
        }
        Ok(pairs)
    }

    fn pop_flavor(&mut self, offset: i64, expected: FlavorType) -> Result<Flavor> {
        let flavor = Offset::try_from(offset)
            .ok()
            .and_then(|offset| self.flavors.remove(offset))
            .ok_or(TrackHashError::MissingFlavor(offset))?;
        if flavor.flavor_type() != expected {
            return Err(TrackHashError::WrongType {
                offset: flavor.offset(),
                expected,
                found: flavor.flavor_type(),
            }
            .into());
        }
        Ok(flavor)
    }

    /// The hash definition as indices into a main segment of `len` sections.
    fn hash_indices(&self, hash: &str, len: usize) -> Result<Vec<usize>> {
        let definition = self
            .definitions
            .get(hash)
            .ok_or_else(|| TrackHashError::MissingDefinition(hash.to_string()))?;
        let numbers = definition
            .numbers()
            .ok_or_else(|| TrackHashError::InvalidDefinition(hash.to_string()))?;

        numbers
            .into_iter()
            .map(|number| {
                if number.fract() != 0.0 {
                    return Err(TrackHashError::InvalidDefinition(hash.to_string()));
                }
                let index = number as i64;
                usize::try_from(index)
                    .ok()
                    .filter(|index| *index < len)
                    .ok_or(TrackHashError::IndexOutOfRange { index, len })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ConvertError::from)
    }
}
