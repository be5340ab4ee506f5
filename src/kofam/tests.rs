use crate::kofam::*;
use color_eyre::eyre::{Report, Result};
use indoc::indoc;
use tempfile::TempDir;

const KOFAMSCAN: &str = indoc! {"
    #\tgene name\tKO\tthrshld\tscore\tE-value\tKO definition
    #\t---------\t------\t-------\t------\t---------\t-------------
    *\tgene_1\tK00855\t213.37\t401.2\t4.1e-121\tphosphoribulokinase
    \tgene_1\tK00876\t266.93\t40.5\t2.3e-11\turidine kinase
    \tgene_2\tK01601\t332.67\t798.5\t5.2e-240\tribulose-bisphosphate carboxylase large chain
    \tgene_2\tK01602\t173.77\t311.3\t1.1e-93\tribulose-bisphosphate carboxylase small chain
    \tgene_3\tK00001\t500.00\t20.1\t0.0011\talcohol dehydrogenase
    *\tgene_1\tK00856\t100.00\t150.0\t3.3e-45\tadenosine kinase
"};

fn parsed() -> Result<ParsedHits, Report> {
    parse_hits(KOFAMSCAN.as_bytes())
}

fn assignments(policy: &Policy) -> Result<Vec<Assignment>, Report> {
    let assignments = group_by_gene(parsed()?.hits)
        .into_iter()
        .map(|(gene, hits)| select(&gene, hits, policy))
        .collect();
    Ok(assignments)
}

fn unmarked(scores: &[(f64, Option<f64>)]) -> Vec<Hit> {
    scores
        .iter()
        .enumerate()
        .map(|(i, (score, threshold))| Hit::new("gene", &format!("K{i:05}"), *threshold, *score, false))
        .collect()
}

// ----------------------------------------------------------------------------
// Parsing

#[test]
fn parse_kofamscan() -> Result<(), Report> {
    let parsed = parsed()?;
    assert_eq!(parsed.hits.len(), 6);
    assert_eq!(parsed.skipped, 0);

    let first = &parsed.hits[0];
    assert!(first.marked);
    assert_eq!(first.gene, "gene_1");
    assert_eq!(first.ko, "K00855");
    assert_eq!(first.threshold, Some(213.37));
    assert_eq!(first.score, 401.2);
    assert_eq!(first.evalue, "4.1e-121");
    assert_eq!(first.definition.as_deref(), Some("phosphoribulokinase"));

    assert!(!parsed.hits[1].marked);
    Ok(())
}

#[test]
fn parse_skips_malformed_rows() -> Result<(), Report> {
    let input = indoc! {"
        *\tgene_1\tK00855\t213.37\t401.2\t4.1e-121\tphosphoribulokinase
        \tgene_1\tK00876

        \tgene_2\tK01601\t332.67\tNA\t5.2e-240\tribulose-bisphosphate carboxylase
        \tgene_2\tK01602\t-\t311.3\t1.1e-93
        \t\tK01603\t10\t11\t1e-5
    "};
    let parsed = parse_hits(input.as_bytes())?;
    let kos: Vec<&str> = parsed.hits.iter().map(|hit| hit.ko.as_str()).collect();
    assert_eq!(kos, ["K00855", "K01602"]);
    assert_eq!(parsed.hits[1].threshold, None);
    assert_eq!(parsed.hits[1].definition, None);
    assert_eq!(parsed.skipped, 3);
    Ok(())
}

#[test]
fn group_first_seen_order() -> Result<(), Report> {
    let groups = group_by_gene(parsed()?.hits);
    let genes: Vec<&str> = groups.iter().map(|(gene, _)| gene.as_str()).collect();
    assert_eq!(genes, ["gene_1", "gene_2", "gene_3"]);

    // scattered rows of gene_1 end up in one group, in input order
    let kos: Vec<&str> = groups[0].1.iter().map(|hit| hit.ko.as_str()).collect();
    assert_eq!(kos, ["K00855", "K00876", "K00856"]);
    Ok(())
}

// ----------------------------------------------------------------------------
// Policy

#[test]
fn policy_validation() {
    assert!(Policy::new(1, None).is_ok());
    assert!(Policy::new(3, Some(0.5)).is_ok());
    assert!(Policy::new(1, Some(0.0)).is_err());
    assert!(Policy::new(1, Some(1.0)).is_err());
    assert!(Policy::new(1, Some(-0.5)).is_err());
    assert!(Policy::new(1, Some(f64::NAN)).is_err());
    assert_eq!(Policy::default(), Policy::new(1, None).unwrap());
}

#[test]
fn kofam_rejects_policy_before_reading() {
    // the input does not exist, the policy error comes first
    let args = KofamArgs { min_score_ratio: Some(1.5), ..Default::default() };
    let error = kofam(&args).unwrap_err();
    assert!(error.to_string().contains("score ratio"));
}

// ----------------------------------------------------------------------------
// Selection

#[test]
fn select_marked_only() -> Result<(), Report> {
    // marked hits win regardless of policy, even over higher unmarked scores
    for policy in [Policy::new(0, None)?, Policy::new(5, Some(0.9))?] {
        let assignments = assignments(&policy)?;
        assert_eq!(assignments[0].kos(), ["K00855", "K00856"]);
    }
    Ok(())
}

#[test]
fn select_top_n() -> Result<(), Report> {
    let hits = unmarked(&[(10.0, Some(100.0)), (30.0, Some(100.0)), (20.0, Some(100.0))]);

    let assignment = select("gene", hits.clone(), &Policy::new(2, None)?);
    assert_eq!(assignment.kos(), ["K00001", "K00002"]);
    assert_eq!(assignment.selected, [1, 2]);

    let assignment = select("gene", hits.clone(), &Policy::new(10, None)?);
    assert_eq!(assignment.kos(), ["K00001", "K00002", "K00000"]);

    let assignment = select("gene", hits, &Policy::new(0, None)?);
    assert!(assignment.kos().is_empty());
    Ok(())
}

#[test]
fn select_ties_keep_input_order() -> Result<(), Report> {
    let hits = unmarked(&[(5.0, None), (9.0, None), (9.0, None), (9.0, None)]);
    let assignment = select("gene", hits, &Policy::new(2, None)?);
    assert_eq!(assignment.selected, [1, 2]);
    Ok(())
}

#[test]
fn select_score_ratio() -> Result<(), Report> {
    let hits = unmarked(&[
        (90.0, Some(100.0)), // 0.9
        (95.0, Some(0.0)),   // no ratio
        (40.0, Some(100.0)), // 0.4
        (50.0, Some(100.0)), // 0.5, on the boundary
        (99.0, None),        // no ratio
        (60.0, Some(-10.0)), // no ratio
    ]);
    let assignment = select("gene", hits, &Policy::new(10, Some(0.5))?);
    assert_eq!(assignment.kos(), ["K00000", "K00003"]);
    for hit in assignment.selected_hits() {
        assert!(hit.score_ratio().is_some_and(|ratio| ratio >= 0.5));
    }
    Ok(())
}

#[test]
fn select_ratio_then_top_n() -> Result<(), Report> {
    // the ratio filter applies before top N, a failing top hit does not use up a slot
    let hits = unmarked(&[(99.0, None), (60.0, Some(100.0)), (55.0, Some(100.0))]);
    let assignment = select("gene", hits, &Policy::new(1, Some(0.5))?);
    assert_eq!(assignment.kos(), ["K00001"]);
    Ok(())
}

#[test]
fn select_worked_example() -> Result<(), Report> {
    let policy = Policy::new(1, Some(0.5))?;
    let assignments = assignments(&policy)?;
    let gene_2 = &assignments[1];
    assert_eq!(gene_2.gene, "gene_2");
    assert_eq!(gene_2.kos(), ["K01601"]);
    assert!(gene_2.is_selected(0));
    assert!(!gene_2.is_selected(1));

    let outputs = Outputs::new(&assignments, false, None)?;
    assert!(outputs.ko_list.contains(&"K01601".to_string()));
    assert!(!outputs.ko_list.contains(&"K01602".to_string()));

    let rows: Vec<&Vec<String>> =
        outputs.full_detail.rows.iter().filter(|row| row[0] == "gene_2").collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][2], "K01601");
    assert_eq!(rows[0][8], "Y");
    assert_eq!(rows[1][2], "K01602");
    assert_eq!(rows[1][8], "N");
    Ok(())
}

// ----------------------------------------------------------------------------
// Outputs

#[test]
fn outputs_consistent() -> Result<(), Report> {
    let assignments = assignments(&Policy::default())?;
    let outputs = Outputs::new(&assignments, false, None)?;

    // gene_1: two marked hits, gene_2: top hit, gene_3: top hit (no ratio filter)
    assert_eq!(outputs.ko_list, ["K00855", "K00856", "K01601", "K00001"]);

    // every candidate appears in the full detail, in input order within each gene
    assert_eq!(outputs.full_detail.rows.len(), 6);
    let selected: Vec<(&str, &str)> = outputs
        .full_detail
        .rows
        .iter()
        .filter(|row| row[8] == "Y")
        .map(|row| (row[0].as_str(), row[2].as_str()))
        .collect();

    let gene_detail: Vec<(&str, &str)> = outputs
        .gene_detail
        .rows
        .iter()
        .map(|row| (row[1].as_str(), row[0].as_str()))
        .collect();

    assert_eq!(selected, gene_detail);
    let kos: Vec<&str> = gene_detail.iter().map(|(_, ko)| *ko).collect();
    assert_eq!(kos, outputs.ko_list);
    Ok(())
}

#[test]
fn outputs_unselected_gene() -> Result<(), Report> {
    let assignments = assignments(&Policy::new(1, Some(0.5))?)?;
    let outputs = Outputs::new(&assignments, false, None)?;

    // gene_3 fails the ratio filter: only in the full detail, never selected
    assert!(!outputs.ko_list.contains(&"K00001".to_string()));
    assert!(!outputs.gene_detail.get_column("gene")?.contains(&"gene_3"));
    let gene_3: Vec<&Vec<String>> =
        outputs.full_detail.rows.iter().filter(|row| row[0] == "gene_3").collect();
    assert_eq!(gene_3.len(), 1);
    assert_eq!(gene_3[0][8], "N");
    Ok(())
}

#[test]
fn outputs_unique() -> Result<(), Report> {
    let hits = vec![
        Hit::new("gene_b", "K00002", Some(1.0), 2.0, true),
        Hit::new("gene_a", "K00002", Some(1.0), 2.0, true),
        Hit::new("gene_c", "K00001", Some(1.0), 2.0, true),
    ];
    let assignments: Vec<Assignment> = group_by_gene(hits)
        .into_iter()
        .map(|(gene, hits)| select(&gene, hits, &Policy::default()))
        .collect();

    let outputs = Outputs::new(&assignments, false, None)?;
    assert_eq!(outputs.ko_list, ["K00002", "K00002", "K00001"]);

    let outputs = Outputs::new(&assignments, true, None)?;
    assert_eq!(outputs.ko_list, ["K00001", "K00002"]);
    Ok(())
}

#[test]
fn outputs_detail_top() -> Result<(), Report> {
    let hits = unmarked(&[(10.0, None), (20.0, None), (30.0, None), (5.0, None)]);
    let assignment = select("gene", hits, &Policy::new(1, None)?);

    // rank 3 is selected, so it is shown even beyond detail_top
    let outputs = Outputs::new(&[assignment], false, Some(1))?;
    let ranks = outputs.full_detail.get_column("rank")?;
    assert_eq!(ranks, ["1", "3"]);
    Ok(())
}

#[test]
fn outputs_columns() -> Result<(), Report> {
    let assignments = assignments(&Policy::default())?;
    let outputs = Outputs::new(&assignments, false, None)?;

    let expected = indoc! {"
        KO\tgene\tthreshold\tscore\tE-value\tmarker\tKO_definition
        K00855\tgene_1\t213.37\t401.2\t4.1e-121\t*\tphosphoribulokinase
    "};
    assert!(outputs.gene_detail.to_tsv().starts_with(expected));

    let header = outputs.full_detail.to_tsv().lines().next().unwrap_or_default().to_string();
    assert_eq!(header, "gene\trank\tKO\tthreshold\tscore\tE-value\tmarker\tKO_definition\tselected");
    Ok(())
}

// ----------------------------------------------------------------------------
// End to end

#[test]
fn kofam_writes_outputs() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let input = dir.path().join("kofamscan.tsv");
    std::fs::write(&input, KOFAMSCAN)?;

    let args = KofamArgs {
        input,
        output_dir: dir.path().join("output"),
        min_score_ratio: Some(0.5),
        ..Default::default()
    };
    let assignments = kofam(&args)?;
    assert_eq!(assignments.len(), 3);

    let ko_list = std::fs::read_to_string(args.output_dir.join(KO_LIST))?;
    assert_eq!(ko_list, "K00855\nK00856\nK01601\n");

    let gene_detail = std::fs::read_to_string(args.output_dir.join(GENE_DETAIL))?;
    assert_eq!(gene_detail.lines().count(), 4);

    let full_detail = std::fs::read_to_string(args.output_dir.join(FULL_DETAIL))?;
    assert_eq!(full_detail.lines().count(), 7);
    Ok(())
}

#[test]
fn kofam_missing_input_writes_nothing() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let args = KofamArgs {
        input: dir.path().join("missing.tsv"),
        output_dir: dir.path().join("output"),
        ..Default::default()
    };
    assert!(kofam(&args).is_err());
    assert!(!args.output_dir.join(KO_LIST).exists());
    Ok(())
}

#[test]
fn kofam_failed_write_leaves_no_partial_output() -> Result<(), Report> {
    let dir = TempDir::new()?;
    let input = dir.path().join("kofamscan.tsv");
    std::fs::write(&input, KOFAMSCAN)?;

    // a previous run left a KO list, and the gene detail path is blocked by a directory
    let output_dir = dir.path().join("output");
    std::fs::create_dir_all(output_dir.join(GENE_DETAIL))?;
    std::fs::write(output_dir.join(KO_LIST), "K99999\n")?;

    let args = KofamArgs { input, output_dir, ..Default::default() };
    assert!(kofam(&args).is_err());

    assert_eq!(std::fs::read_to_string(args.output_dir.join(KO_LIST))?, "K99999\n");
    assert!(!args.output_dir.join(FULL_DETAIL).exists());

    // without an earlier KO list, nothing is left behind
    std::fs::remove_file(args.output_dir.join(KO_LIST))?;
    assert!(kofam(&args).is_err());
    assert!(!args.output_dir.join(KO_LIST).exists());
    Ok(())
}

#[test]
fn outputs_keep_input_numbers() -> Result<(), Report> {
    let input = "\tgene_1\tK00001\t500.00\t20.10\t0.0011\talcohol dehydrogenase\n\tgene_2\tK00002\t\t7\t1e-3\n";
    let assignments: Vec<Assignment> = group_by_gene(parse_hits(input.as_bytes())?.hits)
        .into_iter()
        .map(|(gene, hits)| select(&gene, hits, &Policy::default()))
        .collect();
    let outputs = Outputs::new(&assignments, false, None)?;

    assert_eq!(outputs.gene_detail.get_column("threshold")?, ["500.00", "-"]);
    assert_eq!(outputs.gene_detail.get_column("score")?, ["20.10", "7"]);
    assert_eq!(outputs.full_detail.get_column("threshold")?, ["500.00", "-"]);
    Ok(())
}
