mod common;



#[cfg(test)]
mod test_pipeline;


#[cfg(test)]
mod test_conditions;

#[cfg(test)]
mod test_switches;





#[cfg(test)]
mod test_determinism;
