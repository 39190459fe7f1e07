/*!

This is the long-form manual for `seat_apportionment` and `apportion`.

## The method

For an electoral quotient `Q` and a seat budget `S`:

1. The total of a party is the sum of the votes of its candidates plus the
   votes cast for the party label (list votes).
2. A party is eligible if its total is at least 80% of `Q` (inclusive).
   Ineligible parties win no seat at all.
3. Each eligible party wins `floor(total / Q)` direct seats.
4. The `S - sum(direct)` remaining seats are awarded one by one. At every
   round, each eligible party presents the average `total / (seats + 1)`
   and the highest average wins the seat.
5. Within a party, seats go to the candidates with the most votes. The first
   `direct` of them hold direct seats, the others leftover seats.

Ties between averages are resolved with the tie-break mode of the rules:
`partyName` (default, alphabetical), `higherVotes` (larger total, then
alphabetical) or `random` (hash of the seed, the round and the party name).

The result also reports situations in which the seats are not fully
distributed: no eligible party, direct seats above the budget (the direct
seats are reported as they are, and no leftover seat is awarded), or a party
with fewer candidates than seats.

## Quick start

```bash
apportion -c demos/chapas_2026.json
```

prints a JSON summary of the seats of each party and of the elected
candidates. The quotient and the number of seats of the configuration can be
overridden:

```bash
apportion -c demos/chapas_2026.json --quotient 185000 --seats 10
```

Use `--verbose` to see every round of the leftover seats in the logs.

## Input formats

### Scenario file (JSON)

```json
{
  "contestName": "Deputado Federal 2026",
  "quotient": 190000,
  "seats": 8,
  "tiebreakMode": "partyName",
  "partyOrder": ["PT", "PSD/MDB"],
  "parties": [
    {
      "name": "PT",
      "listVotes": 10000,
      "candidates": [ { "name": "ZE", "votes": 120000, "gender": "M" } ]
    }
  ],
  "candidateFileSources": [ { "provider": "csv", "filePath": "chapas.csv" } ]
}
```

Only `quotient` and one of `parties` or `candidateFileSources` are required.
File paths are relative to the scenario file.

### `csv`

One candidate per line. By default the columns are party, name and votes and
the first line is a header:

```text
partido,nome,votos
PT,ZE,120000
PT,VOTOS LEGENDA,10000
PP,ATILA,105000
```

A line named `VOTOS LEGENDA` or `LEGENDA` holds the list votes of the party.
The positions of the columns (`partyColumnIndex`, `nameColumnIndex`,
`votesColumnIndex`, starting at 1) and of the first line to read
(`firstRowIndex`, starting at 1) can be changed in the file source. Blank
lines count as lines. An optional `genderColumnIndex` reads the gender of the
candidates, which is only copied to the summary.

Vote counts may use `.`, `,` or spaces between groups of three digits
(`120.000`). Decimals are accepted when they are all zeros (`120000.0`);
other decimals are rejected.

### `xlsx`

The same layout as the CSV format, in an Excel worksheet. The first worksheet
is read unless `excelWorksheetName` is provided.

## Output

The summary contains the configuration (`contest`, `quotient`, `seats`,
`threshold`) and the results: the parties in presentation order with their
totals, direct, leftover and total seats, the elected candidates, the audit of
the leftover rounds and the conditions met during the computation. The gender
of the elected candidates is included when it is known.

With `--reference <file>`, the summary is compared with a stored summary and
the differences are printed.

 */
