//! 有界编辑距离

/// Levenshtein 距离（按 Unicode 标量计算），超过 bound 时提前返回 bound + 1
pub fn bounded_levenshtein(a: &str, b: &str, bound: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > bound {
        return bound + 1;
    }
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
            row_min = row_min.min(current[j + 1]);
        }
        if row_min > bound {
            return bound + 1;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()].min(bound + 1)
}
