use std::collections::HashSet;

/// Maps a lowercase Vietnamese letter to its base Latin letter.
fn base_letter(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ'
        | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở'
        | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

/// Lowercases and removes Vietnamese diacritics, including decomposed
/// combining marks.
pub fn strip_diacritics(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(base_letter)
        .collect()
}

/// Case- and diacritic-insensitive key with every non-alphanumeric
/// character removed, so "TP. HCM" and "tphcm" compare equal.
pub fn compact_key(text: &str) -> String {
    strip_diacritics(text)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Splits a comma-delimited alias list, dropping blanks.
pub fn split_alias_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|alias| alias.trim())
        .filter(|alias| !alias.is_empty())
        .map(|alias| alias.to_string())
        .collect()
}

/// Every distinct digit permutation of `number`, starting with `number`
/// itself. Iterative Heap's algorithm; repeated digits collapse.
pub fn permutations(number: &str) -> Vec<String> {
    let mut digits: Vec<char> = number.chars().collect();
    let n = digits.len();
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    let mut record = |digits: &[char]| {
        let candidate: String = digits.iter().collect();
        if seen.insert(candidate.clone()) {
            result.push(candidate);
        }
    };

    record(&digits);
    let mut counters = vec![0usize; n];
    let mut i = 1;
    while i < n {
        if counters[i] < i {
            if i % 2 == 0 {
                digits.swap(0, i);
            } else {
                digits.swap(counters[i], i);
            }
            record(&digits);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }

    result
}

/// C(n, 2).
pub fn pair_count(n: usize) -> u64 {
    if n < 2 {
        return 0;
    }
    (n as u64) * (n as u64 - 1) / 2
}

pub fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Last `n` characters of a digit string, or `None` if it is shorter.
pub fn last_digits(value: &str, n: usize) -> Option<&str> {
    let value = value.trim();
    if value.len() < n || !is_digits(value) {
        return None;
    }
    Some(&value[value.len() - n..])
}
