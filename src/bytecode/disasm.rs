use crate::bytecode::{Instruction, PCode, Pcode};
use crate::generator::GeneratorResult;
use std::collections::{BTreeSet, HashMap};

/// Print disassembly of a linked program
pub fn print_pcode(pcode: &Pcode) -> GeneratorResult<()> {
    println!("=== PCODE PROGRAM ===\n");
    println!("════════════════════════════════════════");
    println!(" {} lines", pcode.len());
    println!("════════════════════════════════════════");
    print!("{}", disassemble_to_string(pcode)?);
    println!();
    Ok(())
}

/// Lines that some JUMP, IFNO or SUBR lands on.
fn collect_jump_targets(pcode: &Pcode) -> GeneratorResult<BTreeSet<usize>> {
    let mut targets = BTreeSet::new();

    for line in pcode.instructions()? {
        for instruction in line {
            if instruction.op.takes_address() {
                if let Some(target) = instruction.operands.first() {
                    targets.insert(*target as usize);
                }
            }
        }
    }

    Ok(targets)
}

// =============================================================================
// String output (for testing/logging)
// =============================================================================

/// Return disassembly as a String, one program line per text line
pub fn disassemble_to_string(pcode: &Pcode) -> GeneratorResult<String> {
    let mut output = String::new();
    let jump_targets = collect_jump_targets(pcode)?;

    for (address, line) in pcode.instructions()?.iter().enumerate() {
        if jump_targets.contains(&address) {
            output.push_str("      ┌──────────────────────────────────\n");
        }

        output.push_str(&format!("{:04} ", address));

        if jump_targets.contains(&address) {
            output.push_str("► ");
        } else {
            output.push_str("  ");
        }

        let instructions: Vec<String> = line.iter().map(format_instruction).collect();
        output.push_str(&instructions.join("  "));
        output.push('\n');
    }

    Ok(output)
}

fn format_instruction(instruction: &Instruction<'_>) -> String {
    match instruction.op {
        PCode::Lstr => {
            let text: String = instruction.operands[1..]
                .iter()
                .map(|c| u32::try_from(*c).ok().and_then(char::from_u32).unwrap_or('?'))
                .collect();
            format!("LSTR {:?}", text)
        }
        op if op.takes_address() => {
            let target = instruction.operands.first().copied().unwrap_or(0);
            format!("{} (→ {:04})", op, target)
        }
        op => {
            let mut text = op.to_string();
            for operand in instruction.operands {
                text.push_str(&format!(" {}", operand));
            }
            text
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Print opcode statistics
pub fn print_pcode_stats(pcode: &Pcode) -> GeneratorResult<()> {
    println!("=== PCODE STATISTICS ===\n");

    let mut op_counts: HashMap<String, usize> = HashMap::new();
    count_ops(pcode, &mut op_counts)?;
    let total_ops: usize = op_counts.values().sum();

    println!("Lines:            {}", pcode.len());
    println!("Instructions:     {}", total_ops);
    println!();

    println!("Op frequency:");
    let mut counts: Vec<_> = op_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    for (op, count) in counts.iter().take(10) {
        let pct = (**count as f64 / total_ops as f64) * 100.0;
        println!("  {:<14} {:>4} ({:>5.1}%)", op, count, pct);
    }

    Ok(())
}

fn count_ops(pcode: &Pcode, counts: &mut HashMap<String, usize>) -> GeneratorResult<()> {
    for line in pcode.instructions()? {
        for instruction in line {
            *counts.entry(instruction.op.mnemonic()).or_insert(0) += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pcode {
        Pcode::new(vec![
            vec![i64::from(PCode::Ldin), 0, i64::from(PCode::Stvg), 9],
            vec![
                i64::from(PCode::Ldvg),
                9,
                i64::from(PCode::Ldin),
                3,
                i64::from(PCode::Less),
                i64::from(PCode::Ifno),
                4,
            ],
            vec![
                i64::from(PCode::Ldvg),
                9,
                i64::from(PCode::Incr),
                i64::from(PCode::Stvg),
                9,
                i64::from(PCode::Jump),
                1,
            ],
            vec![i64::from(PCode::Lstr), 2, 'o' as i64, 'k' as i64, i64::from(PCode::Prnt)],
            vec![i64::from(PCode::Halt)],
        ])
    }

    #[test]
    fn test_disassemble_marks_jump_targets() {
        let output = disassemble_to_string(&sample()).unwrap();
        assert!(output.contains("0001 ► LDVG 9"));
        assert!(output.contains("0004 ► HALT"));
        assert!(output.contains("0000   LDIN 0"));
    }

    #[test]
    fn test_disassemble_shows_targets_and_strings() {
        let output = disassemble_to_string(&sample()).unwrap();
        assert!(output.contains("IFNO (→ 0004)"));
        assert!(output.contains("JUMP (→ 0001)"));
        assert!(output.contains("LSTR \"ok\"  PRNT"));
    }

    #[test]
    fn test_disassemble_rejects_malformed_line() {
        let pcode = Pcode::new(vec![vec![i64::from(PCode::Stvv), 1]]);
        assert!(disassemble_to_string(&pcode).is_err());
    }

    #[test]
    fn test_op_counts() {
        let mut counts = HashMap::new();
        count_ops(&sample(), &mut counts).unwrap();

        assert_eq!(counts.get("LDVG"), Some(&2));
        assert_eq!(counts.get("STVG"), Some(&2));
        assert_eq!(counts.get("HALT"), Some(&1));
        // operands are never counted as opcodes
        assert_eq!(counts.get("NULL"), None);
    }
}
