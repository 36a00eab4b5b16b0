//! # Partitioner
//!
//! Splits a dataset into fixed-size pages and groups those pages into a
//! bounded number of balanced slices, one slice per worker task.
//!
//! Pages are borrowed views into the caller's data; nothing is copied.
//!
//! ```text
//! 12 pages grouped 5 ways (page indices per slice):
//!   [0, 1, 10]  [2, 3, 11]  [4, 5]  [6, 7]  [8, 9]
//! ```

use crate::config::ConfigurationError;
use crate::error::{FanoutError, Result};

/// A contiguous run of at most `page_size` elements.
pub type Page<'a, T> = &'a [T];

/// The pages handed to a single task.
pub type Slice<'a, T> = Vec<Page<'a, T>>;

/// Split `data` into contiguous pages of `page_size` elements. The final page
/// may be shorter.
pub fn paginate<T>(data: &[T], page_size: usize) -> Result<Vec<Page<'_, T>>> {
    if page_size < 1 {
        return Err(ConfigurationError::invalid_value(
            "page_size",
            page_size as u64,
            "page size must be at least 1",
        )
        .into());
    }

    Ok(data.chunks(page_size).collect())
}

/// Group `items` into at most `max_groups` groups whose sizes differ by at most
/// one. Each group takes a contiguous run of `total / max_groups` items (at
/// least one); leftovers are spread front to back over the formed groups.
/// With fewer items than `max_groups`, every item gets its own group.
pub fn group_balanced<P>(items: Vec<P>, max_groups: usize) -> Result<Vec<Vec<P>>> {
    if max_groups < 1 {
        return Err(ConfigurationError::invalid_value(
            "max_queue_length",
            max_groups as u64,
            "group count must be at least 1",
        )
        .into());
    }

    let total = items.len();
    let group_capacity = (total / max_groups).max(1);

    let mut groups: Vec<Vec<P>> = Vec::with_capacity(max_groups.min(total));
    let mut remaining = items.into_iter();

    for index in 0..max_groups {
        if index * group_capacity >= total {
            break;
        }
        groups.push(remaining.by_ref().take(group_capacity).collect());
    }

    let leftover: Vec<P> = remaining.collect();
    debug_assert!(
        leftover.len() <= groups.len(),
        "leftover items exceed formed groups"
    );
    if leftover.len() > groups.len() {
        return Err(FanoutError::PartitionInvariant {
            leftover: leftover.len(),
            groups: groups.len(),
        });
    }

    for (group, item) in groups.iter_mut().zip(leftover) {
        group.push(item);
    }

    Ok(groups)
}

/// Page `data`, then group the pages into at most `max_slices` balanced slices.
/// Empty input yields no slices.
pub fn partition<T>(data: &[T], page_size: usize, max_slices: usize) -> Result<Vec<Slice<'_, T>>> {
    let pages = paginate(data, page_size)?;
    group_balanced(pages, max_slices)
}
