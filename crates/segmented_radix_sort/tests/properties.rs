use proptest::prelude::*;
use segmented_radix_sort::*;

fn offsets_from_lengths(lengths: &[u32]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(lengths.len() + 1);
    offsets.push(0);
    for &len in lengths {
        offsets.push(offsets[offsets.len() - 1] + len);
    }
    offsets
}

fn sort_with(
    keys: &[i32],
    values: &[u32],
    offsets: &[u32],
    options: &SortOptions<'_>,
    descending: bool,
) -> (Vec<i32>, Vec<u32>) {
    let segments = Segments::from_offsets(offsets);
    let stream = Stream::new();
    let mut keys_out = keys.to_vec();
    let mut values_out = values.to_vec();
    let sort = if descending {
        sort_pairs_desc::<i32, u32, u32>
    } else {
        sort_pairs::<i32, u32, u32>
    };

    let mut size = 0;
    sort(
        None,
        &mut size,
        keys,
        &mut keys_out,
        values,
        &mut values_out,
        &segments,
        options,
        &stream,
    )
    .unwrap();
    let mut storage = TemporaryStorage::allocate(size);
    sort(
        Some(storage.as_bytes_mut()),
        &mut size,
        keys,
        &mut keys_out,
        values,
        &mut values_out,
        &segments,
        options,
        &stream,
    )
    .unwrap();
    (keys_out, values_out)
}

fn lengths_and_keys() -> impl Strategy<Value = (Vec<u32>, Vec<i32>)> {
    let length = prop_oneof![4 => 0_u32..=64, 1 => 65_u32..=300];
    prop::collection::vec(length, 0..40).prop_flat_map(|lengths| {
        let n: u32 = lengths.iter().sum();
        let keys = prop::collection::vec(-50_i32..50, n as usize);
        (Just(lengths), keys)
    })
}

proptest! {
    // Stable sort of (key, original index) pairs is the per-segment reference.
    #[test]
    fn prop_matches_stable_reference(
        (lengths, keys) in lengths_and_keys(),
        descending in any::<bool>(),
        classify in any::<bool>(),
    ) {
        let offsets = offsets_from_lengths(&lengths);
        let values: Vec<u32> = (0..keys.len() as u32).collect();
        let base = SegmentedRadixSortConfig::for_types::<i32, u32>();
        let config = if classify {
            base.with_partitioning_threshold(1)
        } else {
            base.with_warp_sort(None)
        };
        let options = SortOptions::default().config(config);
        let (sorted_keys, sorted_values) =
            sort_with(&keys, &values, &offsets, &options, descending);

        for pair in offsets.windows(2) {
            let range = pair[0] as usize..pair[1] as usize;
            let mut expected: Vec<(i32, u32)> = keys[range.clone()]
                .iter()
                .copied()
                .zip(values[range.clone()].iter().copied())
                .collect();
            if descending {
                expected.sort_by(|a, b| b.0.cmp(&a.0));
            } else {
                expected.sort_by_key(|&(k, _)| k);
            }
            let actual: Vec<(i32, u32)> = sorted_keys[range.clone()]
                .iter()
                .copied()
                .zip(sorted_values[range].iter().copied())
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn prop_one_call_equals_per_segment_calls(
        (lengths, keys) in lengths_and_keys(),
    ) {
        let offsets = offsets_from_lengths(&lengths);
        let values: Vec<u32> = (0..keys.len() as u32).collect();
        let options = SortOptions::default();
        let (all_keys, all_values) = sort_with(&keys, &values, &offsets, &options, false);

        for pair in offsets.windows(2) {
            let range = pair[0] as usize..pair[1] as usize;
            let single = [0, pair[1] - pair[0]];
            let (k, v) = sort_with(
                &keys[range.clone()],
                &values[range.clone()],
                &single,
                &options,
                false,
            );
            prop_assert_eq!(&all_keys[range.clone()], &k[..]);
            prop_assert_eq!(&all_values[range], &v[..]);
        }
    }

    #[test]
    fn prop_double_buffer_resort_is_idempotent(
        (lengths, keys) in lengths_and_keys(),
        end_bit in 1_u32..=32,
    ) {
        let offsets = offsets_from_lengths(&lengths);
        let segments = Segments::from_offsets(&offsets);
        let stream = Stream::new();
        let options = SortOptions::default().bits(0..end_bit);
        let (separate, _) = sort_with(&keys, &vec![0; keys.len()], &offsets, &options, false);

        let mut current = keys.clone();
        let mut alternate = vec![0_i32; keys.len()];
        let mut buffer = DoubleBuffer::new(&mut current, &mut alternate);
        let mut size = 0;
        sort_keys_double_buffer(None, &mut size, &mut buffer, &segments, &options, &stream)
            .unwrap();
        let mut storage = TemporaryStorage::allocate(size);
        for _ in 0..2 {
            sort_keys_double_buffer(
                Some(storage.as_bytes_mut()),
                &mut size,
                &mut buffer,
                &segments,
                &options,
                &stream,
            )
            .unwrap();
            prop_assert_eq!(buffer.current(), &separate[..]);
        }
    }
}
