use crate::error::InferenceError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub index: usize,
    pub percent: f32,
}

/// Scales raw scores to percentages and picks the two best classes.
///
/// Ties go to the lowest index. The winner is removed before the second scan,
/// so both entries always refer to distinct classes.
pub fn top_two(scores: &[f32]) -> Result<[Ranked; 2], InferenceError> {
    if scores.len() < 2 {
        return Err(InferenceError::TooFewClasses(scores.len()));
    }

    let percents = scores.iter().map(|score| score * 100.0).collect::<Vec<_>>();
    let too_few = || InferenceError::TooFewClasses(scores.len());
    let first = max_excluding(&percents, None).ok_or_else(too_few)?;
    let second = max_excluding(&percents, Some(first.index)).ok_or_else(too_few)?;
    Ok([first, second])
}

fn max_excluding(percents: &[f32], excluded: Option<usize>) -> Option<Ranked> {
    let mut best: Option<Ranked> = None;
    for (index, &percent) in percents.iter().enumerate() {
        if Some(index) == excluded {
            continue;
        }
        match best {
            Some(current) if percent <= current.percent || percent.is_nan() => {},
            _ => best = Some(Ranked { index, percent }),
        }
    }
    best
}
